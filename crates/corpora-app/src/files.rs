//! Reading upload candidates from disk.

use std::path::Path;

use corpora_core::defaults;
use corpora_core::{Result, UploadFile};

const OCTET_STREAM: &str = "application/octet-stream";

/// Load a file and declare its MIME type.
///
/// The type is sniffed from the content; when the content is not
/// recognised the file extension decides.
pub fn load_upload(path: &Path) -> Result<UploadFile> {
    let content = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = detect_mime(path, &content);
    Ok(UploadFile::new(filename, content, mime_type))
}

fn detect_mime(path: &Path, content: &[u8]) -> String {
    if let Some(kind) = infer::get(content) {
        return kind.mime_type().to_string();
    }
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        defaults::PDF_MIME.to_string()
    } else {
        OCTET_STREAM.to_string()
    }
}
