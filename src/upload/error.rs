use thiserror::Error;

use crate::upload::types::StatusMessage;

/// Anything that can go wrong once a valid archive is being sent.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("failed to read selected file: {0}")]
    ReadFile(#[source] std::io::Error),
    #[error("failed to build multipart body: {0}")]
    InvalidPart(#[source] reqwest::Error),
    #[error("request to extract endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("selected file has type {mime_type:?}, expected a ZIP archive")]
    WrongFileType { mime_type: String },
    #[error(transparent)]
    RequestFailure(#[from] RequestFailure),
    #[error("an extract request is already in flight")]
    AlreadyInFlight,
}

impl ExtractError {
    /// Message to show for this error. `None` leaves the current status alone.
    pub fn status_message(&self) -> Option<StatusMessage> {
        match self {
            Self::NoFileSelected => Some(StatusMessage::NoFileSelected),
            Self::WrongFileType { .. } => Some(StatusMessage::WrongFileType),
            Self::RequestFailure(_) => Some(StatusMessage::ProcessingFailed),
            Self::AlreadyInFlight => None,
        }
    }
}
