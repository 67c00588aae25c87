//! Asset pipeline: the state machine behind the avatar upload/preview screen.

pub mod controller;
pub mod error;
pub mod picker;
pub mod presenter;
pub mod types;

pub use controller::{PipelineController, PipelineSettings};
pub use error::ErrorKind;
pub use picker::{FilePicker, PathPicker, PromptPicker};
pub use presenter::{Presenter, PreviewView, Severity};
pub use types::{FlowOutcome, ObjectNaming, Preview, Transition};
