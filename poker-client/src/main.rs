use anyhow::Result;
use clap::Parser;
use tracing::warn;

use poker_client::{cli::Cli, client};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    // Logs share the terminal with the prompts, so stay quiet unless asked.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if let Err(err) = client::run(cli.client).await {
        warn!("client exited with error: {err:?}");
        return Err(err);
    }

    Ok(())
}
