//! OKR Board CLI
//!
//! Thin harness around the library: generate a workflow for a key result
//! and manage configuration.

use clap::Parser;
use okrboard::cli::{self, Cli, Command};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so stdout stays machine-readable
    let default_level = cli.log_level.as_deref().unwrap_or("info").to_lowercase();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Workflow(args) => cli::workflow::execute(args).await,
        Command::Config(args) => cli::config::execute(args).await,
    }
}
