mod cli;
mod output_writer;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let debug_mode = std::env::var("esd").is_ok();
    let filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("esdx - subdomain enumeration and wildcard-aware validation");

    cli::Cli::parse().run(debug_mode).await
}
