use crate::upload::types::{FileContents, SelectedFile, ZIP_MIME_TYPE};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ZIP_SIGNATURES: [[u8; 4]; 2] = [*b"PK\x03\x04", *b"PK\x05\x06"];

/// Builds a selection from a picked path. Archives are recognised by their
/// header, everything else is typed from its extension.
pub fn select_path(path: &Path) -> Result<SelectedFile, String> {
    let name = path
        .file_name()
        .ok_or("Invalid filename")?
        .to_str()
        .ok_or("Invalid filename encoding")?
        .to_string();

    let metadata = path
        .metadata()
        .map_err(|e| format!("Failed to read file metadata: {}", e))?;
    if !metadata.is_file() {
        return Err(format!("{} is not a file", path.display()));
    }

    let head = read_head(path).map_err(|e| format!("Failed to open file: {}", e))?;

    Ok(SelectedFile {
        name,
        mime_type: detect_mime_type(path, &head),
        size: metadata.len(),
        contents: FileContents::Path(path.to_path_buf()),
    })
}

/// First bytes of the file, up to the signature length; shorter only when the file is.
fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    read_head_from(File::open(path)?)
}

fn read_head_from(reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(ZIP_SIGNATURES[0].len());
    reader
        .take(ZIP_SIGNATURES[0].len() as u64)
        .read_to_end(&mut head)?;
    Ok(head)
}

pub fn detect_mime_type(path: &Path, head: &[u8]) -> String {
    if ZIP_SIGNATURES.iter().any(|sig| head.starts_with(sig)) {
        return ZIP_MIME_TYPE.to_string();
    }
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default()
}
