//! Error taxonomy shared by the digest engine and the verifier.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way a checksum job can fail.
///
/// Errors are `Clone` because they cross from the worker thread to the
/// owning thread inside [`crate::VerifyEvent`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("unsupported algorithm: {name}")]
    UnsupportedAlgorithm { name: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("no file selected")]
    MissingInput,

    #[error("no expected checksum supplied")]
    MissingExpectedDigest,

    #[error("a verification is already running")]
    Busy,

    #[error("background worker stopped: {message}")]
    WorkerLost { message: String },
}

/// Coarse classification of [`Error`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnsupportedAlgorithm,
    FileNotFound,
    PermissionDenied,
    Io,
    MissingInput,
    MissingExpectedDigest,
    Busy,
    WorkerLost,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Io { .. } => ErrorKind::Io,
            Self::MissingInput => ErrorKind::MissingInput,
            Self::MissingExpectedDigest => ErrorKind::MissingExpectedDigest,
            Self::Busy => ErrorKind::Busy,
            Self::WorkerLost { .. } => ErrorKind::WorkerLost,
        }
    }

    /// Convert an `io::Error` raised while touching `path`, keeping the path.
    #[must_use]
    pub fn from_io(err: &io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }
}
