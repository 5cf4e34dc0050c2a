mod client;
mod error;
mod picker;
mod response;
mod types;

pub use client::{ExtractService, HttpExtractClient};
pub use error::{ExtractError, RequestFailure};
pub use picker::select_path;
pub use response::{ExtractResponse, ResponsePayload};
pub use types::{
    validate_selection, DownloadRequest, FileContents, SelectedFile, StatusMessage, UploadRequest,
    ZIP_MIME_TYPE,
};
