use super::CvExtractUploader;
use crate::utils::file_size::format_size;
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(161, 89, 225);
const SUCCESS: Color32 = Color32::from_rgb(0, 180, 0);
const FAILURE: Color32 = Color32::from_rgb(220, 50, 50);

impl CvExtractUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                ui.heading("CV Extractor");
                ui.add_space(5.0);
                ui.label(
                    RichText::new("Upload a ZIP of CVs and get the contacts back as an Excel sheet")
                        .color(ui.visuals().text_color().gamma_multiply(0.7)),
                );
            });

            ui.add_space(20.0);

            ui.group(|ui| {
                ui.horizontal(|ui| {
                    if ui.button("📁 Select ZIP").clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("ZIP archive", &["zip"])
                            .pick_file()
                        {
                            self.select_file(&path);
                        }
                    }
                    match self.selected_file() {
                        Some(file) => {
                            ui.label(format!("Selected: {} ({})", file.name, format_size(file.size)));
                        }
                        None => {
                            ui.label(
                                RichText::new("No file selected")
                                    .color(ui.visuals().text_color().gamma_multiply(0.5)),
                            );
                        }
                    }
                });
            });

            ui.add_space(20.0);

            ui.vertical_centered(|ui| {
                ui.horizontal(|ui| {
                    let button = egui::Button::new("📤 Extract").min_size(egui::vec2(200.0, 40.0));
                    if ui.add_enabled(self.can_extract(), button).clicked() {
                        self.start_extract();
                    }
                    if self.state.is_processing() {
                        ui.add(egui::Spinner::new());
                    }
                });

                ui.add_space(5.0);
                if ui.button("🗑 Clear").clicked() {
                    self.reset();
                }
            });

            ui.add_space(20.0);

            if let Some(status) = self.state.status {
                ui.vertical_centered(|ui| {
                    let color = if status.is_error() { FAILURE } else { SUCCESS };
                    ui.colored_label(color, status.text());
                });
            }

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(15.0);
                self.render_footer(ui);
            });
        });
    }

    fn render_footer(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = &self.state.error_message {
            ui.colored_label(FAILURE, error);
        }

        if let Some(path) = self.state.last_saved.clone() {
            ui.horizontal(|ui| {
                ui.label(format!("Saved to {}", path.display()));
                if ui
                    .add(
                        egui::Label::new(RichText::new("Open").color(ACCENT))
                            .sense(egui::Sense::click()),
                    )
                    .clicked()
                {
                    if let Err(e) = open::that(&path) {
                        self.state.error_message = Some(format!("Failed to open workbook: {}", e));
                    }
                }
            });
        }
    }
}
