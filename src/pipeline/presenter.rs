//! Preview presenter: a pure projection of the pipeline snapshot.

use tokio::sync::watch;

use super::error::ErrorKind;
use super::types::{Failure, PipelineSnapshot, PipelineState, Preview};

pub const DEFAULT_SIZE: u32 = 150;
pub const IDLE_LABEL: &str = "Upload";
pub const BUSY_LABEL: &str = "Uploading…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub severity: Severity,
    pub message: String,
}

/// Everything needed to draw the avatar block and its upload trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    /// Edge length of the square preview, in pixels.
    pub size: u32,
    pub image: Preview,
    pub busy: bool,
    pub status: &'static str,
    pub trigger_label: &'static str,
    pub trigger_enabled: bool,
    pub banner: Option<Banner>,
}

fn banner_for(failure: &Failure) -> Option<Banner> {
    let (severity, message) = match failure.kind {
        ErrorKind::Cancelled => return None,
        ErrorKind::Encoding => (
            Severity::Error,
            format!("Could not read the selected image. {}", failure.message),
        ),
        ErrorKind::Conflict => (
            Severity::Warning,
            "An image with this name already exists. Retry with overwrite enabled to replace it."
                .to_string(),
        ),
        ErrorKind::NotFound => (Severity::Info, "No image yet.".to_string()),
        ErrorKind::StoreUnavailable => (
            Severity::Error,
            format!("Something went wrong, please try again. {}", failure.message),
        ),
    };
    Some(Banner { severity, message })
}

pub fn render(snapshot: &PipelineSnapshot, size: u32) -> PreviewView {
    let busy = snapshot.state.is_busy();
    let banner = match &snapshot.state {
        PipelineState::Failed(failure) => banner_for(failure),
        _ => None,
    };
    PreviewView {
        size,
        image: snapshot.preview.clone(),
        busy,
        status: snapshot.state.name(),
        trigger_label: if busy { BUSY_LABEL } else { IDLE_LABEL },
        trigger_enabled: !busy,
        banner,
    }
}

/// Follows a controller's snapshot. Holds no state of its own.
pub struct Presenter {
    rx: watch::Receiver<PipelineSnapshot>,
    size: u32,
}

impl Presenter {
    pub fn new(rx: watch::Receiver<PipelineSnapshot>, size: u32) -> Self {
        Self { rx, size }
    }

    pub fn view(&self) -> PreviewView {
        render(&self.rx.borrow(), self.size)
    }

    /// Wait for the next snapshot change.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}
