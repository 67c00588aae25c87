//! Encoder: turns a picked local file, or bytes fetched from the store, into a
//! base64 payload that renders directly as a `data:` URI.
//!
//! Reading and encoding are split so callers can upload the raw source bytes
//! and preview the base64 text without deriving one from the other.

pub mod error;
pub mod mime;

use std::path::PathBuf;

use base64::Engine;
use tokio::fs;
use url::Url;

pub use error::EncodingError;

/// Default ceiling for a single picked file.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Result of a platform file pick. Valid for one upload flow only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHandle {
    /// `file://` URL or plain filesystem path.
    pub uri: String,
    /// MIME type reported by the picker; may be empty when unknown.
    pub mime_type: String,
    /// Display name, usually the file name.
    pub name: String,
}

/// Bytes read from a [`LocalFileHandle`] together with their resolved MIME type.
#[derive(Debug, Clone)]
pub struct SourceBytes {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Base64 text plus the MIME type it should be rendered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub base64: String,
    pub mime_type: String,
}

impl EncodedPayload {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

fn local_path(uri: &str) -> Result<PathBuf, EncodingError> {
    match Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|()| EncodingError::UnsupportedUri(uri.to_string())),
        // Single-letter schemes are Windows drive letters (C:\...), not URLs.
        Ok(url) if url.scheme().len() > 1 => Err(EncodingError::UnsupportedUri(uri.to_string())),
        _ => Ok(PathBuf::from(uri)),
    }
}

/// Strip parameters from a content type and drop values too generic to render.
fn specific_mime(content_type: Option<&str>) -> Option<String> {
    let essence = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    if essence.is_empty() || essence == mime::OCTET_STREAM || !essence.contains('/') {
        return None;
    }
    Some(essence)
}

/// Read the bytes a handle points at.
///
/// The MIME type is taken from the handle when the picker reported one,
/// then from the file extension, then from the leading magic bytes.
pub async fn fetch(handle: &LocalFileHandle, max_bytes: u64) -> Result<SourceBytes, EncodingError> {
    let path = local_path(&handle.uri)?;
    let read_err = |source: std::io::Error| EncodingError::Read {
        path: path.display().to_string(),
        source,
    };

    let size = fs::metadata(&path).await.map_err(read_err)?.len();
    if size > max_bytes {
        return Err(EncodingError::TooLarge {
            name: handle.name.clone(),
            size,
            limit: max_bytes,
        });
    }

    let bytes = fs::read(&path).await.map_err(read_err)?;
    if bytes.is_empty() {
        return Err(EncodingError::Empty(handle.name.clone()));
    }
    // The file may have grown between stat and read.
    if bytes.len() as u64 > max_bytes {
        return Err(EncodingError::TooLarge {
            name: handle.name.clone(),
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }

    let mime_type = specific_mime(Some(&handle.mime_type))
        .or_else(|| mime::mime_for_extension(&handle.name).map(str::to_string))
        .or_else(|| mime::sniff(&bytes).map(str::to_string))
        .unwrap_or_else(|| mime::OCTET_STREAM.to_string());

    tracing::debug!(name = %handle.name, size = bytes.len(), mime = %mime_type, "Read local file");
    Ok(SourceBytes { bytes, mime_type })
}

pub fn encode_bytes(bytes: &[u8], mime_type: &str) -> EncodedPayload {
    EncodedPayload {
        base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
    }
}

/// Read a picked file and encode it for preview.
///
/// The upload flow calls [`fetch`] and [`encode_bytes`] separately so it can
/// keep the raw bytes for the request body.
#[allow(dead_code)]
pub async fn encode(handle: &LocalFileHandle, max_bytes: u64) -> Result<EncodedPayload, EncodingError> {
    let source = fetch(handle, max_bytes).await?;
    Ok(encode_bytes(&source.bytes, &source.mime_type))
}

/// Encode bytes downloaded from the store.
///
/// `content_type` is the store's response header, used when it names a
/// specific type; otherwise the type is sniffed from the bytes.
pub fn decode(bytes: &[u8], content_type: Option<&str>) -> Result<EncodedPayload, EncodingError> {
    if bytes.is_empty() {
        return Err(EncodingError::Empty("Downloaded object".to_string()));
    }
    let mime_type = specific_mime(content_type)
        .or_else(|| mime::sniff(bytes).map(str::to_string))
        .unwrap_or_else(|| mime::OCTET_STREAM.to_string());
    Ok(encode_bytes(bytes, &mime_type))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;

    /// Ten bytes that start with a JPEG SOI marker.
    pub(crate) const TINY_JPEG: [u8; 10] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    pub(crate) fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("avatar_sync_tests")
            .join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub(crate) fn write_handle(dir: &Path, name: &str, bytes: &[u8], mime: &str) -> LocalFileHandle {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        LocalFileHandle {
            uri: path.display().to_string(),
            mime_type: mime.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_encode_jpeg_data_uri_prefix() {
        let dir = test_dir("encode_jpeg");
        let handle = write_handle(&dir, "abc.jpg", &TINY_JPEG, "image/jpeg");
        let payload = encode(&handle, DEFAULT_MAX_BYTES).await.unwrap();
        assert!(payload.data_uri().starts_with("data:image/jpeg;base64,"));
        assert_eq!(payload.base64, "/9j/4AAQSkZJRg==");
    }

    #[tokio::test]
    async fn test_encode_accepts_file_url() {
        let dir = test_dir("encode_file_url");
        let mut handle = write_handle(&dir, "abc.png", b"\x89PNG\r\n\x1a\n", "image/png");
        handle.uri = Url::from_file_path(dir.join("abc.png")).unwrap().to_string();
        let payload = encode(&handle, DEFAULT_MAX_BYTES).await.unwrap();
        assert_eq!(payload.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_fetch_infers_mime_when_picker_reports_none() {
        let dir = test_dir("fetch_infer_mime");
        let handle = write_handle(&dir, "photo.webp", b"RIFF\x00\x00\x00\x00WEBP", "");
        let source = fetch(&handle, DEFAULT_MAX_BYTES).await.unwrap();
        assert_eq!(source.mime_type, "image/webp");

        let handle = write_handle(&dir, "blob", &TINY_JPEG, "application/octet-stream");
        let source = fetch(&handle, DEFAULT_MAX_BYTES).await.unwrap();
        assert_eq!(source.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_encode_empty_file_fails() {
        let dir = test_dir("encode_empty");
        let handle = write_handle(&dir, "empty.jpg", b"", "image/jpeg");
        let err = encode(&handle, DEFAULT_MAX_BYTES).await.unwrap_err();
        assert!(matches!(err, EncodingError::Empty(_)));
    }

    #[tokio::test]
    async fn test_encode_missing_file_fails() {
        let dir = test_dir("encode_missing");
        let handle = LocalFileHandle {
            uri: dir.join("gone.jpg").display().to_string(),
            mime_type: "image/jpeg".into(),
            name: "gone.jpg".into(),
        };
        let err = encode(&handle, DEFAULT_MAX_BYTES).await.unwrap_err();
        assert!(matches!(err, EncodingError::Read { .. }));
    }

    #[tokio::test]
    async fn test_encode_too_large_fails() {
        let dir = test_dir("encode_too_large");
        let handle = write_handle(&dir, "big.jpg", &TINY_JPEG, "image/jpeg");
        let err = encode(&handle, 4).await.unwrap_err();
        assert!(matches!(err, EncodingError::TooLarge { size: 10, limit: 4, .. }));
    }

    #[tokio::test]
    async fn test_encode_rejects_remote_uri() {
        let handle = LocalFileHandle {
            uri: "https://example.com/cat.jpg".into(),
            mime_type: "image/jpeg".into(),
            name: "cat.jpg".into(),
        };
        let err = encode(&handle, DEFAULT_MAX_BYTES).await.unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedUri(_)));
    }

    #[test]
    fn test_decode_prefers_specific_content_type() {
        let payload = decode(&TINY_JPEG, Some("image/png; charset=binary")).unwrap();
        assert_eq!(payload.mime_type, "image/png");
    }

    #[test]
    fn test_decode_sniffs_generic_content_type() {
        let payload = decode(&TINY_JPEG, Some("application/octet-stream")).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        let payload = decode(b"plain", None).unwrap();
        assert_eq!(payload.mime_type, mime::OCTET_STREAM);
    }

    #[test]
    fn test_decode_empty_fails() {
        assert!(matches!(decode(&[], Some("image/jpeg")), Err(EncodingError::Empty(_))));
    }
}
