use thiserror::Error;

use crate::encoder::EncodingError;
use crate::store::{ReferenceError, StoreError};

/// Closed set of failure kinds the pipeline reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The user dismissed the picker. Not shown as an error.
    Cancelled,
    /// The picked or downloaded bytes could not be read or encoded.
    Encoding,
    /// An object already exists and overwrite was not requested.
    Conflict,
    /// Nothing is stored at the requested reference yet.
    NotFound,
    /// Network, auth or server failure.
    StoreUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Encoding => "encoding",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every error a flow can end with, before it is folded into pipeline state.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("File selection cancelled")]
    Cancelled,

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Cannot name the uploaded object: {0}")]
    Naming(#[from] ReferenceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Cancelled => ErrorKind::Cancelled,
            PipelineError::Encoding(_) | PipelineError::Naming(_) => ErrorKind::Encoding,
            PipelineError::Store(e) => match e {
                StoreError::Conflict { .. } => ErrorKind::Conflict,
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::Unavailable { .. }
                | StoreError::Transport { .. }
                | StoreError::InvalidUrl(_) => ErrorKind::StoreUnavailable,
            },
        }
    }
}
