//! `ragchat health` command implementation.

use clap::Args;
use ragchat_client::{ApiClient, MemoryUserIdStore};

use super::ApiArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the health command.
#[derive(Args)]
pub(crate) struct HealthArgs {
    #[command(flatten)]
    api: ApiArgs,
}

impl HealthArgs {
    /// Execute the health command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Unhealthy`] if the backend does not answer with success.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.api.load_config()?;

        // Health checks do not touch the persisted session
        let client = ApiClient::from_config(&config.api, MemoryUserIdStore::default())?;

        output.info(&format!("Checking {}...", client.base_url()));
        if !client.check_health() {
            return Err(CliError::Unhealthy(client.base_url().to_owned()));
        }

        output.success("Backend is healthy");
        Ok(())
    }
}
