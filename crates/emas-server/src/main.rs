//! emas-live service entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Live gold-rate tracker: polling feeds, shared state, WebSocket fan-out.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via EMAS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    emas_telemetry::init_logging()?;
    info!("Starting emas-live v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            emas_server::AppConfig::from_file(&path)?
        }
        None => emas_server::AppConfig::load()?,
    };

    let app = emas_server::Application::new(config);
    app.run().await?;

    Ok(())
}
