use thiserror::Error;

/// Typed object-store errors.
///
/// Callers never inspect status codes or body strings; the client classifies
/// every failure into one of these variants.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An object already exists at {bucket}/{path}")]
    Conflict { bucket: String, path: String },

    #[error("No object at {bucket}/{path}")]
    NotFound { bucket: String, path: String },

    #[error("Object store unavailable (HTTP {status}) for {path}: {message}")]
    Unavailable {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Object store request for {path} failed: {source}")]
    Transport {
        source: reqwest::Error,
        path: String,
    },

    #[error("Invalid object store URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message() {
        let e = StoreError::Conflict {
            bucket: "avatars".into(),
            path: "random/abc.jpg".into(),
        };
        assert_eq!(e.to_string(), "An object already exists at avatars/random/abc.jpg");
    }
}
