mod app;
mod config;
mod upload;
mod utils;

use app::CvExtractUploader;
use config::Settings;
use eframe::CreationContext;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use upload::HttpExtractClient;

fn main() -> Result<(), String> {
    let settings = Settings::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = HttpExtractClient::new(&settings.server_url)
        .map_err(|e| format!("Invalid server url {}: {}", settings.server_url, e))?;
    info!("Extract endpoint: {}", client.endpoint());

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start async runtime: {}", e))?;
    let options = settings.controller_options();

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([520.0, 420.0])
            .with_min_inner_size([400.0, 340.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CV Extractor",
        native_options,
        Box::new(move |cc: &CreationContext| {
            Box::new(CvExtractUploader::new(cc, Arc::new(client), options, runtime))
        }),
    )
    .map_err(|e| {
        error!("UI exited with error: {}", e);
        e.to_string()
    })
}
