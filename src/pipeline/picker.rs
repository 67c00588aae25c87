//! File pickers: where the upload flow gets its [`LocalFileHandle`] from.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::encoder::mime::{self, MimeFilter};
use crate::encoder::LocalFileHandle;

#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("{name} is not a {filter} file")]
    Filtered { name: String, filter: String },

    #[error("{0} does not name a file")]
    NoFileName(String),

    #[error("Failed to read the selection: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform file picker. `Ok(None)` means the user cancelled.
#[async_trait::async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self, filter: &MimeFilter) -> Result<Option<LocalFileHandle>, PickerError>;
}

/// Picks a path fixed up front, e.g. from the command line.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: PathBuf,
}

impl PathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn handle_for_path(path: &Path, filter: &MimeFilter) -> Result<LocalFileHandle, PickerError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PickerError::NoFileName(path.display().to_string()))?
        .to_string();
    let mime_type = mime::mime_for_extension(&name).unwrap_or(mime::OCTET_STREAM);
    if !filter.matches(mime_type) {
        return Err(PickerError::Filtered {
            name,
            filter: filter.to_string(),
        });
    }

    let absolute = std::path::absolute(path)?;
    let uri = Url::from_file_path(&absolute)
        .map(String::from)
        .unwrap_or_else(|()| absolute.display().to_string());
    Ok(LocalFileHandle {
        uri,
        mime_type: mime_type.to_string(),
        name,
    })
}

#[async_trait::async_trait]
impl FilePicker for PathPicker {
    async fn pick(&self, filter: &MimeFilter) -> Result<Option<LocalFileHandle>, PickerError> {
        handle_for_path(&self.path, filter).map(Some)
    }
}

/// Asks for a path on stdin. Empty input, end of input or the shutdown
/// token all count as cancelling.
#[derive(Debug, Clone)]
pub struct PromptPicker {
    cancel: CancellationToken,
}

impl PromptPicker {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

/// Drag-and-drop into a terminal often wraps the path in quotes.
fn clean_input(line: &str) -> &str {
    line.trim().trim_matches(|c| c == '\'' || c == '"')
}

#[async_trait::async_trait]
impl FilePicker for PromptPicker {
    async fn pick(&self, filter: &MimeFilter) -> Result<Option<LocalFileHandle>, PickerError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("Path to a {} file (empty to cancel): ", filter).as_bytes())
            .await?;
        stdout.flush().await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let line = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(None),
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            return Ok(None);
        };
        let input = clean_input(&line);
        if input.is_empty() {
            return Ok(None);
        }
        handle_for_path(&crate::config::expand_tilde(input), filter).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_path_picker_builds_file_url() {
        let picker = PathPicker::new("/tmp/avatars/abc.jpg");
        let handle = picker.pick(&MimeFilter::images()).await.unwrap().unwrap();
        assert_eq!(handle.name, "abc.jpg");
        assert_eq!(handle.mime_type, "image/jpeg");
        assert!(handle.uri.starts_with("file://"));
        assert!(handle.uri.ends_with("/avatars/abc.jpg"));
    }

    #[tokio::test]
    async fn test_path_picker_applies_filter() {
        let picker = PathPicker::new("/tmp/notes.txt");
        let err = picker.pick(&MimeFilter::images()).await.unwrap_err();
        assert!(matches!(err, PickerError::Filtered { .. }));

        let any = MimeFilter::parse("*/*").unwrap();
        let handle = picker.pick(&any).await.unwrap().unwrap();
        assert_eq!(handle.mime_type, mime::OCTET_STREAM);
    }

    #[tokio::test]
    async fn test_path_picker_rejects_directory_like_path() {
        let picker = PathPicker::new("/");
        let err = picker.pick(&MimeFilter::images()).await.unwrap_err();
        assert!(matches!(err, PickerError::NoFileName(_)));
    }

    #[test]
    fn test_clean_input_strips_quotes() {
        assert_eq!(clean_input("  '/tmp/a b.jpg'\n"), "/tmp/a b.jpg");
        assert_eq!(clean_input("\"/tmp/x.png\""), "/tmp/x.png");
        assert_eq!(clean_input("   "), "");
    }

    #[tokio::test]
    async fn test_prompt_picker_cancelled_token_returns_none() {
        let token = CancellationToken::new();
        token.cancel();
        let picker = PromptPicker::new(token);
        let picked = picker.pick(&MimeFilter::images()).await.unwrap();
        assert!(picked.is_none());
    }
}
