//! Reads a selected file into a data URL

use tracing::debug;

use crate::data_url;
use crate::error::ReadError;
use crate::file::{SelectedFile, DEFAULT_CONTENT_TYPE};

/// Read the whole file and encode it as a data URL.
///
/// An empty content type falls back to `application/octet-stream`, so every
/// file gets an encoding regardless of what it contains.
pub async fn read_data_url(file: &SelectedFile) -> Result<String, ReadError> {
    let bytes = file.read_bytes().await.map_err(|source| ReadError {
        name: file.name.clone(),
        source,
    })?;

    let mime_type = if file.content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        file.content_type.as_str()
    };

    debug!("Read {} bytes from {}", bytes.len(), file.name);
    Ok(data_url::encode(mime_type, &bytes))
}
