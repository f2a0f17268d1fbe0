use aerofs_core::{AeroClient, AeroError, DEFAULT_BASE_URL};
use clap::Parser;

use crate::commands::Command;

/// Command-line configuration. Every connection setting can also come from
/// the environment or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "aerofs")]
#[command(about = "Inspect and modify files and folders on an AeroFS appliance")]
pub struct Config {
    /// Base URL of the appliance
    #[arg(long, env = "AEROFS_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// OAuth access token
    #[arg(long, env = "AEROFS_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    pub fn client(&self) -> Result<AeroClient, AeroError> {
        AeroClient::with_base_url(&self.api_url, self.token.clone())
    }
}
