//! Handle to the document selected for analysis.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when opening a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Only PDF documents are supported: {0}")]
    NotPdf(PathBuf),

    #[error("Failed to read document metadata: {0}")]
    Io(#[from] io::Error),
}

/// A registration document on disk, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Path to the file.
    pub path: PathBuf,
    /// File name shown to the user and sent with the upload.
    pub name: String,
    /// Size in bytes at the time the file was opened.
    pub size_bytes: u64,
}

impl DocumentFile {
    /// Open a document, checking that it exists and looks like a PDF.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }

        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(DocumentError::NotAFile(path.to_path_buf()));
        }

        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(DocumentError::NotPdf(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size_bytes: metadata.len(),
        })
    }

    /// Size in KB, used to scale simulated timing.
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}
