//! CLI command implementations.

pub(crate) mod ask;
pub(crate) mod health;
pub(crate) mod render;

pub(crate) use ask::AskArgs;
pub(crate) use health::HealthArgs;
pub(crate) use render::RenderArgs;

use std::path::PathBuf;

use clap::Args;
use ragchat_config::{CliSettings, Config};

use crate::error::CliError;

/// Backend connection arguments shared by commands that talk to the API.
#[derive(Args)]
pub(crate) struct ApiArgs {
    /// Path to configuration file (default: auto-discover ragchat.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and host-based selection).
    #[arg(long, env = "RAGCHAT_API_URL")]
    base_url: Option<String>,

    /// Deployment host used to select the backend URL.
    #[arg(long)]
    host: Option<String>,

    /// Deployment port used to select the backend URL.
    #[arg(long)]
    port: Option<u16>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

impl ApiArgs {
    /// Load configuration with these arguments applied on top.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            base_url: self.base_url.clone(),
            host: self.host.clone(),
            port: self.port,
            timeout_secs: self.timeout,
            user_id_file: None,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}
