//! In-memory [`RemoteStore`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{AssetReference, RemoteStore, StoreError, StoredObject, UploadOptions};

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    upload_calls: AtomicUsize,
    download_calls: AtomicUsize,
    unavailable: AtomicBool,
    on_upload: Mutex<Option<Hook>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, path: &str, bytes: &[u8], content_type: Option<&str>) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the network were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Run `hook` at the start of every upload call.
    pub fn on_upload(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_upload.lock().unwrap() = Some(Box::new(hook));
    }

    fn check_available(&self, bucket: &str, path: &AssetReference) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                status: 503,
                path: format!("{}/{}", bucket, path),
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteStore for MemoryStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &AssetReference,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StoreError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.on_upload.lock().unwrap().as_ref() {
            hook();
        }
        self.check_available(bucket, path)?;

        let key = (bucket.to_string(), path.to_string());
        let mut objects = self.objects.lock().unwrap();
        if !options.overwrite && objects.contains_key(&key) {
            return Err(StoreError::Conflict {
                bucket: bucket.to_string(),
                path: path.to_string(),
            });
        }
        objects.insert(
            key,
            StoredObject {
                bytes,
                content_type: options.content_type.clone(),
            },
        );
        Ok(())
    }

    async fn download(&self, bucket: &str, path: &AssetReference) -> Result<StoredObject, StoreError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available(bucket, path)?;
        self.get(bucket, path.as_str()).ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> AssetReference {
        AssetReference::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_overwrite_true_is_idempotent() {
        let store = MemoryStore::new();
        let opts = UploadOptions {
            overwrite: true,
            content_type: Some("image/jpeg".into()),
        };
        let path = reference("random/abc.jpg");
        store.upload("avatars", &path, vec![1, 2, 3], &opts).await.unwrap();
        let first = store.get("avatars", "random/abc.jpg").unwrap();
        store.upload("avatars", &path, vec![1, 2, 3], &opts).await.unwrap();
        let second = store.get("avatars", "random/abc.jpg").unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_conflict_leaves_existing_bytes() {
        let store = MemoryStore::new();
        store.insert("avatars", "random/abc.jpg", b"old", Some("image/jpeg"));
        let err = store
            .upload(
                "avatars",
                &reference("random/abc.jpg"),
                b"new".to_vec(),
                &UploadOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.get("avatars", "random/abc.jpg").unwrap().bytes, b"old");
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.download("avatars", &reference("nope.jpg")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.download_calls(), 1);
    }

    #[tokio::test]
    async fn test_buckets_are_separate_namespaces() {
        let store = MemoryStore::new();
        store.insert("public", "a.jpg", b"x", None);
        assert!(store.download("avatars", &reference("a.jpg")).await.is_err());
        assert!(store.download("public", &reference("a.jpg")).await.is_ok());
    }
}
