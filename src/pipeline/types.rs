use std::path::Path;

use super::error::ErrorKind;
use crate::encoder::mime;
use crate::encoder::LocalFileHandle;
use crate::store::{AssetReference, ReferenceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Where the pipeline is. Exactly one value is live per controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Picking,
    Encoding,
    Uploading,
    Downloading,
    /// `None` when there is no stored asset yet.
    Ready(Option<AssetReference>),
    Failed(Failure),
}

impl PipelineState {
    /// True while a flow is running; new flows are rejected until it settles.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Picking | Self::Encoding | Self::Uploading | Self::Downloading
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Picking => "picking",
            Self::Encoding => "encoding",
            Self::Uploading => "uploading",
            Self::Downloading => "downloading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// What the preview area shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Placeholder,
    /// A `data:` URI ready to render.
    Image(String),
}

/// The single value the controller publishes and the presenter renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineSnapshot {
    pub state: PipelineState,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: PipelineState,
    pub to: PipelineState,
}

/// How a flow request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The flow reached `Ready`. Carries the stored reference, if any.
    Completed(Option<AssetReference>),
    Cancelled,
    Failed(ErrorKind),
    /// Another flow was running; nothing happened.
    Rejected,
}

/// Naming scheme for uploaded objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectNaming {
    /// `{prefix}/{file name}`
    #[default]
    Original,
    /// `{prefix}/{uuid}.{ext}`
    Random,
}

impl ObjectNaming {
    pub fn reference_for(
        &self,
        prefix: &str,
        handle: &LocalFileHandle,
        mime_type: &str,
    ) -> Result<AssetReference, ReferenceError> {
        // Display names may carry directories on some platforms; keep only the last component.
        let file_name = Path::new(&handle.name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");

        let name = match self {
            ObjectNaming::Original => file_name.to_string(),
            ObjectNaming::Random => {
                let ext = Path::new(file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase)
                    .or_else(|| mime::extension_for_mime(mime_type).map(str::to_string));
                let id = uuid::Uuid::new_v4();
                match ext {
                    Some(ext) => format!("{}.{}", id, ext),
                    None => id.to_string(),
                }
            }
        };
        if name.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            AssetReference::parse(&name)
        } else {
            AssetReference::parse(&format!("{}/{}", prefix, name))
        }
    }
}
