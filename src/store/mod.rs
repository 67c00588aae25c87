//! Remote object store client.
//!
//! [`RemoteStore`] is the seam the pipeline talks to; [`HttpStore`] speaks the
//! `PUT/GET /{bucket}/{path}` protocol. The client performs a single attempt
//! per call and leaves retry decisions to the user.

pub mod error;
pub mod http;
#[cfg(test)]
pub mod memory;
pub mod reference;

pub use error::StoreError;
pub use http::{HttpStore, StoreConfig};
pub use reference::{AssetReference, ReferenceError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Replace an existing object instead of failing with a conflict.
    pub overwrite: bool,
    pub content_type: Option<String>,
}

/// An object as returned by [`RemoteStore::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// Store `bytes` at `bucket/path`.
    ///
    /// Fails with [`StoreError::Conflict`] when an object exists and
    /// `options.overwrite` is false; the existing object is left untouched.
    async fn upload(
        &self,
        bucket: &str,
        path: &AssetReference,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StoreError>;

    /// Fetch the object at `bucket/path`.
    async fn download(&self, bucket: &str, path: &AssetReference) -> Result<StoredObject, StoreError>;
}
