use std::path::PathBuf;

use thiserror::Error;

/// Failure to address or rewrite a document range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("position {pos} is outside the document (content size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("position {pos} is not inside a text block")]
    NotInTextblock { pos: usize },

    #[error("invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate suggestion id '{0}'")]
    DuplicateId(String),

    #[error("suggestion '{0}' has an empty label")]
    EmptyLabel(String),
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error while opening log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

impl LoggingError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
