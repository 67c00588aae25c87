//! Asset pipeline controller.
//!
//! Owns the [`PipelineSnapshot`] and is the only writer of it. Two flows are
//! driven from here:
//!
//! - upload: pick -> encode -> optimistic preview -> upload -> ready
//! - download: reference -> download -> decode -> preview -> ready
//!
//! The optimistic preview is a separate, synchronous write that lands before
//! the upload request is issued. The commit (`Ready`) or failure write that
//! follows never touches the preview, so a failed upload keeps showing the
//! local image alongside the error.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::error::{ErrorKind, PipelineError};
use super::picker::FilePicker;
use super::types::{
    Failure, FlowOutcome, ObjectNaming, PipelineSnapshot, PipelineState, Preview, Transition,
};
use crate::encoder::{self, mime::MimeFilter, EncodedPayload};
use crate::store::{AssetReference, RemoteStore, UploadOptions};

const TRANSITION_BUFFER: usize = 64;

/// Settings for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub bucket: String,
    /// Folder under the bucket that uploads are written to.
    pub prefix: String,
    pub naming: ObjectNaming,
    pub overwrite: bool,
    pub filter: MimeFilter,
    pub max_bytes: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            bucket: "avatars".to_string(),
            prefix: "random".to_string(),
            naming: ObjectNaming::Original,
            overwrite: false,
            filter: MimeFilter::images(),
            max_bytes: encoder::DEFAULT_MAX_BYTES,
        }
    }
}

pub struct PipelineController {
    store: Arc<dyn RemoteStore>,
    picker: Box<dyn FilePicker>,
    settings: PipelineSettings,
    snapshot: watch::Sender<PipelineSnapshot>,
    transitions_tx: mpsc::Sender<Transition>,
    transitions_rx: Option<mpsc::Receiver<Transition>>,
}

impl PipelineController {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        picker: Box<dyn FilePicker>,
        settings: PipelineSettings,
    ) -> Self {
        let (snapshot, _) = watch::channel(PipelineSnapshot::default());
        let (transitions_tx, transitions_rx) = mpsc::channel(TRANSITION_BUFFER);
        Self {
            store,
            picker,
            settings,
            snapshot,
            transitions_tx,
            transitions_rx: Some(transitions_rx),
        }
    }

    /// Read-only view of the snapshot for presenters.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Takes the transition receiver. Can only be called once.
    pub fn take_transitions(&mut self) -> Option<mpsc::Receiver<Transition>> {
        self.transitions_rx.take()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn publish(&self, from: PipelineState, to: PipelineState) {
        tracing::debug!(from = from.name(), to = to.name(), "Pipeline transition");
        if self.transitions_tx.try_send(Transition { from, to }).is_err() {
            tracing::trace!("Transition buffer full or closed, dropping event");
        }
    }

    /// Move to `next`, replacing the preview in the same write when given one.
    fn set_state(&self, next: PipelineState, preview: Option<Preview>) {
        let mut from = PipelineState::Idle;
        self.snapshot.send_modify(|snap| {
            from = std::mem::replace(&mut snap.state, next.clone());
            if let Some(preview) = preview {
                snap.preview = preview;
            }
        });
        self.publish(from, next);
    }

    /// Start a flow unless one is already running. Starting clears any prior failure.
    fn try_begin(&self, next: PipelineState, preview: Option<Preview>) -> bool {
        let mut from = None;
        self.snapshot.send_if_modified(|snap| {
            if snap.state.is_busy() {
                return false;
            }
            from = Some(std::mem::replace(&mut snap.state, next.clone()));
            if let Some(preview) = preview {
                snap.preview = preview;
            }
            true
        });

        match from {
            Some(from) => {
                self.publish(from, next);
                true
            }
            None => {
                tracing::debug!(
                    requested = next.name(),
                    "Flow already in progress, ignoring request"
                );
                false
            }
        }
    }

    /// Dismiss a failure, returning to `Idle`. No-op in any other state.
    #[allow(dead_code)] // for long-lived callers; a CLI run starts from Idle
    pub fn reset(&self) -> bool {
        let mut from = None;
        self.snapshot.send_if_modified(|snap| {
            if !matches!(snap.state, PipelineState::Failed(_)) {
                return false;
            }
            from = Some(std::mem::replace(&mut snap.state, PipelineState::Idle));
            true
        });
        match from {
            Some(from) => {
                self.publish(from, PipelineState::Idle);
                true
            }
            None => false,
        }
    }

    /// Fold a flow error into state. Cancelling is silent and returns to `Idle`.
    fn settle(&self, error: PipelineError) -> FlowOutcome {
        match error.kind() {
            ErrorKind::Cancelled => {
                tracing::info!("File selection cancelled");
                self.set_state(PipelineState::Idle, None);
                FlowOutcome::Cancelled
            }
            kind @ (ErrorKind::Encoding
            | ErrorKind::Conflict
            | ErrorKind::NotFound
            | ErrorKind::StoreUnavailable) => {
                if kind == ErrorKind::NotFound {
                    tracing::info!("{}", error);
                } else {
                    tracing::warn!(kind = %kind, "{}", error);
                }
                self.set_state(
                    PipelineState::Failed(Failure {
                        kind,
                        message: error.to_string(),
                    }),
                    None,
                );
                FlowOutcome::Failed(kind)
            }
        }
    }

    /// Pick a file, preview it immediately and upload it.
    pub async fn upload_flow(&self) -> FlowOutcome {
        if !self.try_begin(PipelineState::Picking, None) {
            return FlowOutcome::Rejected;
        }

        match self.run_upload().await {
            Ok(reference) => {
                tracing::info!(
                    bucket = %self.settings.bucket,
                    reference = %reference,
                    "Upload complete"
                );
                self.set_state(PipelineState::Ready(Some(reference.clone())), None);
                FlowOutcome::Completed(Some(reference))
            }
            Err(e) => self.settle(e),
        }
    }

    async fn run_upload(&self) -> Result<AssetReference, PipelineError> {
        let handle = match self.picker.pick(&self.settings.filter).await {
            Ok(Some(handle)) => handle,
            Ok(None) => return Err(PipelineError::Cancelled),
            Err(e) => {
                tracing::warn!("File picker failed: {}", e);
                return Err(PipelineError::Cancelled);
            }
        };

        self.set_state(PipelineState::Encoding, None);
        // Preview text and upload body both come from these bytes; neither is
        // derived from the other.
        let source = encoder::fetch(&handle, self.settings.max_bytes).await?;
        let payload = encoder::encode_bytes(&source.bytes, &source.mime_type);
        let reference =
            self.settings
                .naming
                .reference_for(&self.settings.prefix, &handle, &source.mime_type)?;

        self.set_state(
            PipelineState::Uploading,
            Some(Preview::Image(payload.data_uri())),
        );

        let options = UploadOptions {
            overwrite: self.settings.overwrite,
            content_type: Some(source.mime_type),
        };
        tracing::info!(
            bucket = %self.settings.bucket,
            reference = %reference,
            size = source.bytes.len(),
            "Uploading"
        );
        self.store
            .upload(&self.settings.bucket, &reference, source.bytes, &options)
            .await?;
        Ok(reference)
    }

    /// Show the asset stored at `reference`, or the placeholder when there is none.
    pub async fn load(&self, reference: Option<AssetReference>) -> FlowOutcome {
        let Some(reference) = reference else {
            if !self.try_begin(PipelineState::Ready(None), Some(Preview::Placeholder)) {
                return FlowOutcome::Rejected;
            }
            return FlowOutcome::Completed(None);
        };

        // Clear the preview so a failed download never leaves another asset on screen.
        if !self.try_begin(PipelineState::Downloading, Some(Preview::Placeholder)) {
            return FlowOutcome::Rejected;
        }

        match self.run_download(&reference).await {
            Ok(payload) => {
                tracing::info!(
                    bucket = %self.settings.bucket,
                    reference = %reference,
                    mime = %payload.mime_type,
                    "Download complete"
                );
                self.set_state(
                    PipelineState::Ready(Some(reference.clone())),
                    Some(Preview::Image(payload.data_uri())),
                );
                FlowOutcome::Completed(Some(reference))
            }
            Err(e) => self.settle(e),
        }
    }

    async fn run_download(&self, reference: &AssetReference) -> Result<EncodedPayload, PipelineError> {
        tracing::info!(bucket = %self.settings.bucket, reference = %reference, "Downloading");
        let object = self.store.download(&self.settings.bucket, reference).await?;
        Ok(encoder::decode(&object.bytes, object.content_type.as_deref())?)
    }
}
