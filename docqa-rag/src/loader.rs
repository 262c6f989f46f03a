//! Plain-text document loading.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::document::Document;
use crate::error::{QaError, Result};

/// Load a UTF-8 plain-text file into a [`Document`].
///
/// The document ID is derived from the file stem; the full path is recorded
/// in the metadata and `source_uri` so answers can cite their origin.
///
/// # Errors
///
/// - [`QaError::SourceNotFound`] if `path` does not exist or is not a file.
/// - [`QaError::DecodeError`] if the bytes are not valid UTF-8.
/// - [`QaError::Io`] if the file exists but cannot be read.
pub async fn load_text(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();

    let is_file = tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Err(QaError::SourceNotFound { path: path.to_path_buf() });
    }

    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8(bytes).map_err(|e| QaError::DecodeError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    let source = path.display().to_string();
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), source.clone());

    info!(document.id = %id, text_len = text.len(), "loaded document");

    Ok(Document { id, text, metadata, source_uri: Some(source) })
}
