use thiserror::Error;

/// Failures turning local or downloaded bytes into a displayable payload.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Unsupported file URI '{0}': only local files can be read")]
    UnsupportedUri(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("{0} is empty")]
    Empty(String),

    #[error("{name} is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
}
