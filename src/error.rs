//! Error types for the viewer.
//!
//! Asset loading and backend setup return `ViewerResult<T>`; any error at
//! startup is fatal (no partial scene is ever constructed).

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Malformed mesh or image file: bad magic, wrong depth sentinel,
    /// truncated data, out-of-range index.
    #[error("format error: {0}")]
    Format(String),

    /// File missing or unreadable.
    #[error("i/o error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Surface, adapter, or device creation failed.
    #[error("render backend initialization failed: {0}")]
    BackendInit(String),

    /// WGSL validation failure, captured via a device error scope.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),
}

impl ViewerError {
    pub fn format(reason: impl Into<String>) -> Self {
        ViewerError::Format(reason.into())
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        ViewerError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Prefix a format error with the file it came from.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            ViewerError::Format(reason) => {
                ViewerError::Format(format!("{}: {}", path.display(), reason))
            }
            other => other,
        }
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
