use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use entrena_cli::commands::{ui, Cli};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; --verbose wins over the default but not over RUST_LOG
    let default_level = if cli.verbose() { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize tokio runtime
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            cli.execute().await
        });

    if let Err(e) = result {
        ui::error(&e);
        std::process::exit(1);
    }

    Ok(())
}
