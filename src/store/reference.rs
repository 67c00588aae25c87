use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Asset reference is empty")]
    Empty,

    #[error("Asset reference '{0}' contains an empty, '.' or '..' segment")]
    BadSegment(String),
}

/// Key of a stored object within a bucket, e.g. `random/abc.jpg`.
///
/// Immutable once parsed and never empty, so store calls cannot be made
/// against a blank path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetReference(String);

impl AssetReference {
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let trimmed = raw.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(ReferenceError::Empty);
        }
        if trimmed
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..")
        {
            return Err(ReferenceError::BadSegment(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl std::fmt::Display for AssetReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
