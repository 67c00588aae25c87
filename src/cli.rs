use clap::{Args, Parser, Subcommand};

use crate::encoder::DEFAULT_MAX_BYTES;
use crate::pipeline::presenter::DEFAULT_SIZE;
use crate::types::{LogLevel, NamingPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "avatar-sync",
    version,
    about = "Upload an image to an object store and preview it"
)]
pub struct Cli {
    /// Base URL of the object store; objects live at {url}/{bucket}/{path}
    #[arg(long, env = "AVATAR_SYNC_STORE_URL")]
    pub store_url: Option<String>,

    /// Bucket holding the images
    #[arg(long, default_value = "avatars")]
    pub bucket: String,

    /// Session bearer token (prompted for when missing).
    /// WARNING: passing via --token is visible in process listings.
    /// Prefer the AVATAR_SYNC_TOKEN environment variable instead.
    #[arg(long, env = "AVATAR_SYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Project API key sent as the `apikey` header
    #[arg(long, env = "AVATAR_SYNC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Edge length of the preview in pixels
    #[arg(long, default_value_t = DEFAULT_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    pub size: u32,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress_bar: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick an image, preview it and upload it
    Upload(UploadArgs),
    /// Download a stored image and preview it
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image to upload (asks interactively when omitted)
    #[arg(short = 'f', long)]
    pub file: Option<String>,

    /// Replace an existing object with the same name
    #[arg(long)]
    pub overwrite: bool,

    /// How the uploaded object is named
    #[arg(long, value_enum, default_value = "original")]
    pub naming: NamingPolicy,

    /// Folder inside the bucket for uploads
    #[arg(long, default_value = "random")]
    pub prefix: String,

    /// MIME pattern the picked file must match
    #[arg(long, default_value = "image/*")]
    pub filter: String,

    /// Largest file accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_bytes: u64,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Object path inside the bucket, e.g. random/abc.jpg
    pub reference: String,

    /// Print the preview data URI to stdout
    #[arg(long)]
    pub print_data_uri: bool,
}
