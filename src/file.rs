//! Selected file handles
//!
//! A [`SelectedFile`] is what one entry of a file-selection event carries:
//! a name, a MIME type, a size, and a way to get at the bytes. Handles are
//! cheap to clone; content is only read when a pipeline stage asks for it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{ProcessError, Result};

/// MIME type used when neither content sniffing nor the extension gives one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Where a handle's bytes live
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Already in memory (drag-and-drop, tests)
    Memory(Arc<[u8]>),
    /// On disk; read lazily
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl SelectedFile {
    /// Build an in-memory handle. `size` is taken from the byte length.
    pub fn from_bytes(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Build a handle for a file on disk, sniffing its MIME type from content.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let content_type = match infer::get_from_path(path)? {
            Some(kind) => kind.mime_type().to_string(),
            None => content_type_from_extension(path),
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        debug!("Selected {} ({}, {} bytes)", name, content_type, metadata.len());

        Ok(Self {
            name,
            content_type,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Whether image-only enrichment applies to this file
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Read the full content of the handle.
    pub async fn read_bytes(&self) -> std::io::Result<Arc<[u8]>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(Arc::clone(bytes)),
            FileSource::Path(path) => Ok(tokio::fs::read(path).await?.into()),
        }
    }
}

/// Build the handles for one selection event from filesystem paths.
///
/// Failing to stat or sniff any path fails the whole selection; per-file
/// content errors are left to the pipeline.
pub async fn select_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SelectedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = SelectedFile::from_path(path).await.map_err(|e| {
            ProcessError::Selection(format!("{}: {}", path.as_ref().display(), e))
        })?;
        files.push(file);
    }
    Ok(files)
}

/// Fallback MIME detection for content `infer` doesn't recognise (text, svg, ...)
pub fn content_type_from_extension(path: &Path) -> String {
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tiff" | "tif" => "image/tiff",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        _ => DEFAULT_CONTENT_TYPE,
    }.to_string()
}
