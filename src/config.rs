use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::cli::{Cli, Command};
use crate::encoder::mime::MimeFilter;
use crate::pipeline::PipelineSettings;
use crate::session::SessionToken;
use crate::store::{AssetReference, StoreConfig};

/// What this invocation does.
#[derive(Debug, Clone)]
pub enum Action {
    Upload { file: Option<PathBuf> },
    Download {
        reference: AssetReference,
        print_data_uri: bool,
    },
}

/// Application configuration, validated from the CLI.
pub struct Config {
    pub store: StoreConfig,
    pub token: Option<String>,
    pub pipeline: PipelineSettings,
    pub action: Action,
    pub preview_size: u32,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("store_url", &self.store.base_url.as_str())
            .field("api_key", &self.store.api_key.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("pipeline", &self.pipeline)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Expand ~ to the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn validate_bucket(bucket: &str) -> anyhow::Result<String> {
    let bucket = bucket.trim();
    if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
        anyhow::bail!("Invalid bucket name '{}'", bucket);
    }
    Ok(bucket.to_string())
}

impl Config {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let store_url = cli
            .store_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("--store-url (or AVATAR_SYNC_STORE_URL) is required")
            })?;
        let base_url =
            Url::parse(store_url).with_context(|| format!("Invalid store URL '{}'", store_url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("Store URL must use http or https, got '{}'", base_url.scheme());
        }

        let store = StoreConfig {
            base_url,
            api_key: cli.api_key.filter(|k| !k.trim().is_empty()),
            timeout: cli.timeout_secs.map(Duration::from_secs),
        };

        let mut pipeline = PipelineSettings {
            bucket: validate_bucket(&cli.bucket)?,
            ..PipelineSettings::default()
        };

        let action = match cli.command {
            Command::Upload(args) => {
                pipeline.overwrite = args.overwrite;
                pipeline.naming = args.naming.into();
                pipeline.prefix = args.prefix;
                pipeline.max_bytes = args.max_bytes;
                pipeline.filter = MimeFilter::parse(&args.filter)
                    .ok_or_else(|| anyhow::anyhow!("Invalid MIME filter '{}'", args.filter))?;
                Action::Upload {
                    file: args.file.as_deref().map(expand_tilde),
                }
            }
            Command::Download(args) => Action::Download {
                reference: AssetReference::parse(&args.reference)
                    .with_context(|| format!("Invalid reference '{}'", args.reference))?,
                print_data_uri: args.print_data_uri,
            },
        };

        Ok(Self {
            store,
            token: cli.token,
            pipeline,
            action,
            preview_size: cli.size,
            no_progress_bar: cli.no_progress_bar,
        })
    }
}

/// Use the configured session token, or ask for one on an interactive terminal.
pub async fn resolve_token(configured: Option<String>) -> anyhow::Result<SessionToken> {
    if let Some(token) = configured.and_then(SessionToken::new) {
        return Ok(token);
    }
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("No session token. Pass --token or set AVATAR_SYNC_TOKEN.");
    }
    let entered =
        tokio::task::spawn_blocking(|| rpassword::prompt_password("Session token: ")).await??;
    SessionToken::new(entered).ok_or_else(|| anyhow::anyhow!("Session token is empty"))
}
