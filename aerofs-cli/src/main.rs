mod commands;
mod config;

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let config = Config::parse();
    let client = config.client()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(&client, config.command, &mut out).await
}
