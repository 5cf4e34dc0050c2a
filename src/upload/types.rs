use std::fmt;
use std::path::PathBuf;

use crate::upload::error::{ExtractError, RequestFailure};

/// Content type a selected archive must carry before it is submitted.
pub const ZIP_MIME_TYPE: &str = "application/x-zip-compressed";

/// Multipart field the server reads the archive from.
pub const UPLOAD_FIELD_NAME: &str = "uploaded_file";

/// Path the archive is posted to, resolved against the server origin.
pub const EXTRACT_PATH: &str = "/extract_data";

pub const DOWNLOAD_FILE_NAME: &str = "extracted_data.xlsx";
pub const PLACEHOLDER_HREF: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file the user picked. Contents are only read when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub contents: FileContents,
}

impl SelectedFile {
    pub fn in_memory(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            contents: FileContents::Memory(bytes),
        }
    }

    pub fn is_zip(&self) -> bool {
        self.mime_type == ZIP_MIME_TYPE
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, RequestFailure> {
        match &self.contents {
            FileContents::Memory(bytes) => Ok(bytes.clone()),
            FileContents::Path(path) => tokio::fs::read(path)
                .await
                .map_err(RequestFailure::ReadFile),
        }
    }
}

/// Checks run before anything is sent, in order, stopping at the first failure.
pub fn validate_selection(file: Option<SelectedFile>) -> Result<SelectedFile, ExtractError> {
    let file = file.ok_or(ExtractError::NoFileSelected)?;
    if !file.is_zip() {
        return Err(ExtractError::WrongFileType {
            mime_type: file.mime_type,
        });
    }
    Ok(file)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub field_name: &'static str,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub async fn from_selected(file: &SelectedFile) -> Result<Self, RequestFailure> {
        let bytes = file.read_bytes().await?;
        Ok(Self {
            field_name: UPLOAD_FIELD_NAME,
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    NoFileSelected,
    WrongFileType,
    Processed,
    ProcessingFailed,
}

impl StatusMessage {
    pub fn text(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "Please select a file.",
            Self::WrongFileType => "Please select a ZIP file.",
            Self::Processed => "CVs processed successfully! Download the Excel sheet.",
            Self::ProcessingFailed => {
                "An error occurred while processing the CVs. Please try again."
            }
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Processed)
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Stand-in for the transient download link shown after a successful extract.
/// `workbook` is only filled when saving the response body is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub href: &'static str,
    pub file_name: &'static str,
    pub workbook: Option<Vec<u8>>,
}

impl DownloadRequest {
    pub fn placeholder() -> Self {
        Self {
            href: PLACEHOLDER_HREF,
            file_name: DOWNLOAD_FILE_NAME,
            workbook: None,
        }
    }

    pub fn with_workbook(bytes: Vec<u8>) -> Self {
        Self {
            workbook: Some(bytes),
            ..Self::placeholder()
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.workbook.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_texts_match_the_fixed_messages() {
        assert_eq!(StatusMessage::NoFileSelected.to_string(), "Please select a file.");
        assert_eq!(StatusMessage::WrongFileType.to_string(), "Please select a ZIP file.");
        assert_eq!(
            StatusMessage::Processed.to_string(),
            "CVs processed successfully! Download the Excel sheet."
        );
        assert_eq!(
            StatusMessage::ProcessingFailed.to_string(),
            "An error occurred while processing the CVs. Please try again."
        );
        assert!(!StatusMessage::Processed.is_error());
        assert!(StatusMessage::WrongFileType.is_error());
    }

    #[test]
    fn missing_file_is_reported_before_type() {
        let err = validate_selection(None).unwrap_err();
        assert!(matches!(err, ExtractError::NoFileSelected));
    }

    #[test]
    fn only_the_exact_zip_type_passes() {
        for mime in ["text/plain", "application/zip", "APPLICATION/X-ZIP-COMPRESSED", ""] {
            let file = SelectedFile::in_memory("cvs.zip", mime, b"PK".to_vec());
            match validate_selection(Some(file)) {
                Err(ExtractError::WrongFileType { mime_type }) => assert_eq!(mime_type, mime),
                other => panic!("{mime:?} should be rejected, got {other:?}"),
            }
        }

        let file = SelectedFile::in_memory("cvs.zip", ZIP_MIME_TYPE, b"PK".to_vec());
        assert_eq!(validate_selection(Some(file.clone())).unwrap(), file);
    }

    #[tokio::test]
    async fn upload_request_carries_name_type_and_bytes() {
        let file = SelectedFile::in_memory("batch.zip", ZIP_MIME_TYPE, vec![1, 2, 3]);
        let request = UploadRequest::from_selected(&file).await.unwrap();
        assert_eq!(request.field_name, "uploaded_file");
        assert_eq!(request.file_name, "batch.zip");
        assert_eq!(request.mime_type, ZIP_MIME_TYPE);
        assert_eq!(request.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn unreadable_path_becomes_a_request_failure() {
        let file = SelectedFile {
            name: "gone.zip".into(),
            mime_type: ZIP_MIME_TYPE.into(),
            size: 0,
            contents: FileContents::Path(PathBuf::from("/definitely/not/here/gone.zip")),
        };
        let err = UploadRequest::from_selected(&file).await.unwrap_err();
        assert!(matches!(err, RequestFailure::ReadFile(_)));
    }

    #[test]
    fn placeholder_download_has_no_payload() {
        let download = DownloadRequest::placeholder();
        assert_eq!(download.href, "#");
        assert_eq!(download.file_name, "extracted_data.xlsx");
        assert!(download.is_placeholder());
        assert!(!DownloadRequest::with_workbook(vec![0]).is_placeholder());
    }
}
