//! avatar-sync: pick a local image, preview it, and sync it with a remote
//! object store.
//!
//! The pipeline controller owns a single snapshot of state plus preview and
//! drives two flows: upload (pick, encode, optimistic preview, upload) and
//! download (fetch, decode, preview). The terminal view is a pure projection
//! of that snapshot.

#![warn(clippy::all)]

mod cli;
mod config;
mod encoder;
mod pipeline;
mod session;
mod shutdown;
mod store;
mod terminal;
mod types;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{Action, Config};
use pipeline::{
    ErrorKind, FilePicker, FlowOutcome, PathPicker, PipelineController, Presenter, Preview,
    PromptPicker,
};
use store::HttpStore;
use terminal::TerminalView;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_cli(cli)?;
    tracing::debug!(?config, "Loaded configuration");

    let token = config::resolve_token(config.token.clone()).await?;
    let store = Arc::new(HttpStore::new(config.store.clone(), token)?);
    let shutdown_token = shutdown::install_signal_handler()?;

    let picker: Box<dyn FilePicker> = match &config.action {
        Action::Upload { file: Some(path) } => Box::new(PathPicker::new(path.clone())),
        _ => Box::new(PromptPicker::new(shutdown_token)),
    };

    let mut controller = PipelineController::new(store, picker, config.pipeline.clone());
    let mut transitions = controller
        .take_transitions()
        .ok_or_else(|| anyhow::anyhow!("Transition feed already taken"))?;
    let mut presenter = Presenter::new(controller.subscribe(), config.preview_size);
    let view = TerminalView::new(config.no_progress_bar);
    view.render(&presenter.view());

    let flow = async {
        match &config.action {
            Action::Upload { .. } => controller.upload_flow().await,
            Action::Download { reference, .. } => controller.load(Some(reference.clone())).await,
        }
    };
    tokio::pin!(flow);

    let outcome = loop {
        tokio::select! {
            outcome = &mut flow => break outcome,
            Some(transition) = transitions.recv() => view.step(&transition),
            Ok(()) = presenter.changed() => view.render(&presenter.view()),
        }
    };
    while let Ok(transition) = transitions.try_recv() {
        view.step(&transition);
    }

    let final_view = presenter.view();
    view.finish(&final_view);

    let bucket = &controller.settings().bucket;
    match outcome {
        FlowOutcome::Completed(reference) => {
            match (&config.action, reference) {
                (Action::Upload { .. }, Some(reference)) => {
                    println!("Uploaded {}/{}", bucket, reference);
                }
                (Action::Download { print_data_uri, .. }, Some(reference)) => {
                    println!("Loaded {}/{}", bucket, reference);
                    if *print_data_uri {
                        if let Preview::Image(uri) = controller.snapshot().preview {
                            println!("{}", uri);
                        }
                    }
                }
                (_, None) => println!("No image yet."),
            }
            Ok(())
        }
        FlowOutcome::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
        FlowOutcome::Failed(ErrorKind::Conflict) => {
            anyhow::bail!("Upload failed: object already exists (pass --overwrite to replace it)")
        }
        FlowOutcome::Failed(kind) => anyhow::bail!("Flow failed: {}", kind),
        FlowOutcome::Rejected => anyhow::bail!("Another flow is already in progress"),
    }
}
