//! Terminal rendering of the preview view.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::{Preview, PreviewView, Severity, Transition};

/// Spinner-backed status line that mirrors [`PreviewView`] updates.
pub struct TerminalView {
    pb: ProgressBar,
}

fn create_spinner(no_progress_bar: bool) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

/// MIME type and decoded size of a `data:` URI, when it is one.
fn describe_image(uri: &str) -> Option<(&str, usize)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, b64) = rest.split_once(";base64,")?;
    let padding = b64.bytes().rev().take_while(|b| *b == b'=').count();
    let size = (b64.len() / 4 * 3).saturating_sub(padding);
    Some((mime, size))
}

fn status_line(view: &PreviewView) -> String {
    let image = match &view.image {
        Preview::Placeholder => "placeholder".to_string(),
        Preview::Image(uri) => match describe_image(uri) {
            Some((mime, size)) => format!("{} {} bytes", mime, size),
            None => "image".to_string(),
        },
    };
    format!(
        "[{}] {} | {}x{} {}",
        view.trigger_label, view.status, view.size, view.size, image
    )
}

impl TerminalView {
    pub fn new(no_progress_bar: bool) -> Self {
        Self {
            pb: create_spinner(no_progress_bar),
        }
    }

    pub fn render(&self, view: &PreviewView) {
        // The interactive picker owns the terminal line while picking.
        if view.status == "picking" {
            return;
        }
        self.pb.set_message(status_line(view));
        self.pb.tick();
    }

    pub fn step(&self, transition: &Transition) {
        self.pb.suspend(|| {
            tracing::info!(
                from = transition.from.name(),
                to = transition.to.name(),
                "Pipeline step"
            );
        });
    }

    /// Clear the spinner and print the final view.
    pub fn finish(&self, view: &PreviewView) {
        self.pb.finish_and_clear();
        println!("{}", status_line(view));
        if let Some(banner) = &view.banner {
            match banner.severity {
                Severity::Info => tracing::info!("{}", banner.message),
                Severity::Warning => tracing::warn!("{}", banner.message),
                Severity::Error => tracing::error!("{}", banner.message),
            }
        }
    }
}
