#[cfg(feature = "pdf")]
mod pdf;
mod text;

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;

use std::path::Path;

use super::{DocumentError, DocumentMetadata};

/// Canonicalize `path` and reject it when larger than `max_size` bytes.
pub(super) async fn checked_path(
    path: &Path,
    max_size: u64,
) -> Result<std::path::PathBuf, DocumentError> {
    let path = tokio::fs::canonicalize(path).await?;
    let meta = tokio::fs::metadata(&path).await?;
    if meta.len() > max_size {
        return Err(DocumentError::FileTooLarge(meta.len()));
    }
    Ok(path)
}

pub(super) fn metadata_for(path: &Path, content_type: &str) -> DocumentMetadata {
    let mut extra = std::collections::HashMap::new();
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        extra.insert("file_name".to_owned(), name.to_owned());
    }
    DocumentMetadata {
        source: path.display().to_string(),
        content_type: content_type.to_owned(),
        extra,
    }
}
