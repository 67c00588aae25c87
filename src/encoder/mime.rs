//! MIME type helpers shared by the encoder and the file pickers.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guess an image MIME type from a file name's extension.
pub fn mime_for_extension(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/vnd.microsoft.icon",
        _ => return None,
    };
    Some(mime)
}

/// Preferred file extension for a MIME type, used when generating object names.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let ext = match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/bmp" => "bmp",
        "image/svg+xml" => "svg",
        "image/vnd.microsoft.icon" => "ico",
        _ => return None,
    };
    Some(ext)
}

/// Identify common image formats from their leading magic bytes.
pub fn sniff(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}

/// A picker filter such as `image/*`, `*/*` or an exact `image/png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeFilter {
    kind: String,
    subtype: String,
}

impl MimeFilter {
    pub fn parse(pattern: &str) -> Option<Self> {
        let (kind, subtype) = pattern.trim().split_once('/')?;
        if kind.is_empty() || subtype.is_empty() || (kind == "*" && subtype != "*") {
            return None;
        }
        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
        })
    }

    pub fn images() -> Self {
        Self {
            kind: "image".to_string(),
            subtype: "*".to_string(),
        }
    }

    pub fn matches(&self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return false;
        };
        (self.kind == "*" || self.kind == kind) && (self.subtype == "*" || self.subtype == subtype)
    }
}

impl std::fmt::Display for MimeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_extension_case_insensitive() {
        assert_eq!(mime_for_extension("IMG_0001.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("avatar.png"), Some("image/png"));
        assert_eq!(mime_for_extension("notes.txt"), None);
        assert_eq!(mime_for_extension("no_extension"), None);
    }

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), Some("image/jpeg"));
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n"), Some("image/png"));
        assert_eq!(sniff(b"GIF89a"), Some("image/gif"));
        assert_eq!(sniff(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff(b"hello"), None);
        assert_eq!(sniff(&[]), None);
    }

    #[test]
    fn test_filter_wildcard_subtype() {
        let filter = MimeFilter::parse("image/*").unwrap();
        assert!(filter.matches("image/jpeg"));
        assert!(filter.matches("IMAGE/PNG"));
        assert!(!filter.matches("video/mp4"));
        assert!(!filter.matches("garbage"));
    }

    #[test]
    fn test_filter_exact_and_any() {
        let exact = MimeFilter::parse("image/png").unwrap();
        assert!(exact.matches("image/png; charset=binary"));
        assert!(!exact.matches("image/jpeg"));

        let any = MimeFilter::parse("*/*").unwrap();
        assert!(any.matches("application/pdf"));
    }

    #[test]
    fn test_filter_rejects_malformed() {
        assert!(MimeFilter::parse("image").is_none());
        assert!(MimeFilter::parse("*/png").is_none());
        assert!(MimeFilter::parse("/png").is_none());
        assert_eq!(MimeFilter::images().to_string(), "image/*");
    }
}
