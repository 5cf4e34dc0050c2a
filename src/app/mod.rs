mod controller;
mod state;
mod ui;

pub use controller::{
    ControllerOptions, DownloadTrigger, FileSource, ProcessingIndicator, StatusSink,
    UploadController,
};
pub use state::{ExtractState, UiEvent};

use crate::upload::{
    select_path, DownloadRequest, ExtractError, ExtractService, SelectedFile, StatusMessage,
};
use eframe::{egui, App};
use std::path::Path;
use std::sync::mpsc::{self as std_mpsc, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// The file currently chosen in the picker, shared with extract tasks.
#[derive(Clone, Default)]
pub struct SharedSelection(Arc<Mutex<Option<SelectedFile>>>);

impl SharedSelection {
    pub fn set(&self, file: Option<SelectedFile>) {
        *self.slot() = file;
    }

    /// The slot is only ever replaced whole, so a poisoned guard still holds a valid value.
    fn slot(&self) -> MutexGuard<'_, Option<SelectedFile>> {
        self.0.lock().unwrap_or_else(|poisoned| {
            warn!("Selection lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl FileSource for SharedSelection {
    fn selected_file(&self) -> Option<SelectedFile> {
        self.slot().clone()
    }
}

/// Forwards controller output to the UI thread and wakes it up.
struct UiChannel {
    sender: Sender<UiEvent>,
    ctx: egui::Context,
}

impl UiChannel {
    fn send(&self, event: UiEvent) {
        if self.sender.send(event).is_err() {
            debug!("UI is gone, dropping extract event");
        }
        self.ctx.request_repaint();
    }
}

impl StatusSink for UiChannel {
    fn show(&self, message: StatusMessage) {
        self.send(UiEvent::Status(message));
    }
}

impl ProcessingIndicator for UiChannel {
    fn set_processing(&self, processing: bool) {
        self.send(UiEvent::Processing(processing));
    }
}

impl DownloadTrigger for UiChannel {
    fn trigger(&self, download: DownloadRequest) {
        self.send(UiEvent::Download(download));
    }
}

pub struct CvExtractUploader {
    selection: SharedSelection,
    state: ExtractState,
    controller: UploadController,
    runtime: Runtime,
}

impl CvExtractUploader {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        service: Arc<dyn ExtractService>,
        options: ControllerOptions,
        runtime: Runtime,
    ) -> Self {
        info!("Initializing CV extract uploader");
        let (sender, receiver) = std_mpsc::channel();
        let channel = Arc::new(UiChannel {
            sender,
            ctx: cc.egui_ctx.clone(),
        });
        let selection = SharedSelection::default();
        let controller = UploadController::new(
            Arc::new(selection.clone()),
            channel.clone(),
            channel.clone(),
            channel,
            service,
            options,
        );

        Self {
            selection,
            state: ExtractState {
                event_receiver: Some(receiver),
                ..ExtractState::default()
            },
            controller,
            runtime,
        }
    }

    pub fn select_file(&mut self, path: &Path) {
        match select_path(path) {
            Ok(file) => {
                info!("Selected '{}' ({})", file.name, file.mime_type);
                self.selection.set(Some(file));
                self.state.error_message = None;
            }
            Err(e) => {
                error!("Could not use {}: {}", path.display(), e);
                self.selection.set(None);
                self.state.error_message = Some(e);
            }
        }
    }

    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.selection.selected_file()
    }

    pub fn can_extract(&self) -> bool {
        !(self.controller.options().guard_in_flight && self.controller.is_in_flight())
    }

    pub fn start_extract(&mut self) {
        self.state.error_message = None;
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            match controller.handle_extract_click().await {
                Ok(response) => debug!("Extract click settled with {}", response.status),
                Err(ExtractError::AlreadyInFlight) => debug!("Extract click skipped"),
                Err(e) => debug!("Extract click ended with error: {}", e),
            }
        });
    }

    pub fn reset(&mut self) {
        info!("Resetting selection and messages");
        self.selection.set(None);
        self.state.clear_messages();
    }

    pub fn update_state(&mut self) {
        let mut downloads = Vec::new();
        if let Some(receiver) = &self.state.event_receiver {
            let events: Vec<UiEvent> = receiver.try_iter().collect();
            for event in events {
                if let Some(download) = self.state.apply(event) {
                    downloads.push(download);
                }
            }
        }

        for download in downloads {
            self.handle_download(download);
        }
    }

    fn handle_download(&mut self, download: DownloadRequest) {
        let Some(workbook) = download.workbook else {
            info!(
                "Download link '{}' for {} is a placeholder, nothing to save",
                download.href, download.file_name
            );
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(download.file_name)
            .add_filter("Excel workbook", &["xlsx"])
            .save_file()
        else {
            info!("Workbook save cancelled");
            return;
        };

        match std::fs::write(&path, &workbook) {
            Ok(()) => {
                info!("Saved workbook ({} bytes) to {}", workbook.len(), path.display());
                self.state.last_saved = Some(path);
            }
            Err(e) => {
                let msg = format!("Failed to save workbook: {}", e);
                error!("{}", msg);
                self.state.error_message = Some(msg);
            }
        }
    }
}

impl App for CvExtractUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state();
        if self.state.is_processing() {
            ctx.request_repaint();
        }
        self.render(ctx);
    }
}
