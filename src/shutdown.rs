//! Ctrl+C / SIGTERM handling.
//!
//! The first signal cancels a [`CancellationToken`]; only the file picker
//! listens to it, since uploads and downloads in flight cannot be
//! interrupted. A second signal force-exits.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Install signal handlers and return the token cancelled on the first signal.
pub(crate) fn install_signal_handler() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let count = Arc::new(AtomicU32::new(0));

    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())?
    };

    let handler_token = token.clone();
    tokio::spawn(async move {
        loop {
            #[cfg(unix)]
            {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }

            #[cfg(not(unix))]
            {
                if tokio::signal::ctrl_c().await.is_err() {
                    tracing::warn!("Failed to listen for Ctrl+C");
                    return;
                }
            }

            let prev = count.fetch_add(1, Ordering::SeqCst);
            if prev == 0 {
                tracing::info!("Shutdown requested; a transfer already in flight runs to completion");
                tracing::info!("Press Ctrl+C again to force exit");
                handler_token.cancel();
            } else {
                tracing::warn!("Force exit requested");
                std::process::exit(130);
            }
        }
    });

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::mime::MimeFilter;
    use crate::pipeline::{FilePicker, PromptPicker};

    #[tokio::test]
    async fn install_returns_live_token() {
        let token = install_signal_handler().unwrap();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_token_cancels_prompt_picker() {
        let token = install_signal_handler().unwrap();
        token.cancel();
        let picker = PromptPicker::new(token);
        let picked = picker.pick(&MimeFilter::images()).await.unwrap();
        assert!(picked.is_none());
    }
}
