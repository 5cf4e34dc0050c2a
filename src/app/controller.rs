use crate::upload::{
    validate_selection, DownloadRequest, ExtractError, ExtractResponse, ExtractService,
    SelectedFile, StatusMessage, UploadRequest,
};
use derivative::Derivative;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

pub trait FileSource: Send + Sync {
    fn selected_file(&self) -> Option<SelectedFile>;
}

pub trait StatusSink: Send + Sync {
    fn show(&self, message: StatusMessage);
}

pub trait ProcessingIndicator: Send + Sync {
    fn set_processing(&self, processing: bool);
}

pub trait DownloadTrigger: Send + Sync {
    fn trigger(&self, download: DownloadRequest);
}

#[derive(Derivative, Clone, Copy, PartialEq, Eq)]
#[derivative(Debug, Default)]
pub struct ControllerOptions {
    #[derivative(Default(value = "true"))]
    pub clear_indicator_on_settle: bool,
    pub guard_in_flight: bool,
    pub save_workbook: bool,
}

/// Drives a single "extract" click: validate the selection, post it and
/// report the outcome. Cloning shares the in-flight flag.
#[derive(Clone)]
pub struct UploadController {
    files: Arc<dyn FileSource>,
    status: Arc<dyn StatusSink>,
    indicator: Arc<dyn ProcessingIndicator>,
    downloads: Arc<dyn DownloadTrigger>,
    service: Arc<dyn ExtractService>,
    options: ControllerOptions,
    in_flight: Arc<AtomicBool>,
}

/// Releases the in-flight flag when a guarded click settles.
struct InFlight(Option<Arc<AtomicBool>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(flag) = &self.0 {
            flag.store(false, Ordering::Release);
        }
    }
}

impl UploadController {
    pub fn new(
        files: Arc<dyn FileSource>,
        status: Arc<dyn StatusSink>,
        indicator: Arc<dyn ProcessingIndicator>,
        downloads: Arc<dyn DownloadTrigger>,
        service: Arc<dyn ExtractService>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            files,
            status,
            indicator,
            downloads,
            service,
            options,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn handle_extract_click(&self) -> Result<ExtractResponse, ExtractError> {
        let _guard = match self.claim() {
            Some(guard) => guard,
            None => {
                warn!("Extract clicked while a request is still running, ignoring");
                return Err(ExtractError::AlreadyInFlight);
            }
        };

        let file = match validate_selection(self.files.selected_file()) {
            Ok(file) => file,
            Err(e) => {
                info!("Extract rejected: {}", e);
                self.report(&e);
                return Err(e);
            }
        };

        self.indicator.set_processing(true);
        let result = self.submit(&file).await;

        match &result {
            Ok(response) => {
                info!("Extract of '{}' finished: {}", file.name, response.describe());
                self.status.show(StatusMessage::Processed);
                self.downloads.trigger(self.download_for(response));
            }
            Err(e) => {
                error!("Extract of '{}' failed: {}", file.name, e);
                self.report(e);
            }
        }

        if self.options.clear_indicator_on_settle {
            self.indicator.set_processing(false);
        }
        result
    }

    async fn submit(&self, file: &SelectedFile) -> Result<ExtractResponse, ExtractError> {
        let request = UploadRequest::from_selected(file).await?;
        Ok(self.service.submit(request).await?)
    }

    fn claim(&self) -> Option<InFlight> {
        if !self.options.guard_in_flight {
            return Some(InFlight(None));
        }
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(Some(self.in_flight.clone())))
    }

    fn report(&self, err: &ExtractError) {
        if let Some(message) = err.status_message() {
            self.status.show(message);
        }
    }

    fn download_for(&self, response: &ExtractResponse) -> DownloadRequest {
        match response.workbook() {
            Some(bytes) if self.options.save_workbook => DownloadRequest::with_workbook(bytes.to_vec()),
            _ => DownloadRequest::placeholder(),
        }
    }
}
