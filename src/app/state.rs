use crate::upload::{DownloadRequest, StatusMessage};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

/// What extract tasks report back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Status(StatusMessage),
    Processing(bool),
    Download(DownloadRequest),
}

#[derive(Default)]
pub struct ExtractState {
    pub status: Option<StatusMessage>,
    /// Number of requests that raised the indicator and have not cleared it yet.
    pub processing: usize,
    pub error_message: Option<String>,
    pub last_saved: Option<PathBuf>,
    pub event_receiver: Option<Receiver<UiEvent>>,
}

impl ExtractState {
    /// Applies one event. Downloads are handed back to the caller, which owns the dialogs.
    pub fn apply(&mut self, event: UiEvent) -> Option<DownloadRequest> {
        match event {
            UiEvent::Status(message) => {
                self.status = Some(message);
                None
            }
            UiEvent::Processing(true) => {
                self.processing += 1;
                None
            }
            UiEvent::Processing(false) => {
                self.processing = self.processing.saturating_sub(1);
                None
            }
            UiEvent::Download(download) => Some(download),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing > 0
    }

    pub fn get_status_text(&self) -> &'static str {
        self.status.map(|s| s.text()).unwrap_or_default()
    }

    pub fn clear_messages(&mut self) {
        self.status = None;
        self.error_message = None;
        self.last_saved = None;
    }
}
