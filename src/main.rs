use clap::{Args, Parser};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};

use gogen_stats::{setup_logging, Config, StatsApp, WsConnector};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Path to the config file, layered config/ files are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stats endpoint URL, overrides the configured one
    #[arg(short, long)]
    url: Option<String>,

    /// Dump default config and exit
    #[arg(long = "dump-default-config")]
    dump_default: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line args
    let cli = Cli::parse();

    if cli.common.dump_default {
        let config = Config::default();
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    // Load config
    let mut config = match &cli.common.config {
        Some(path) => Config::from_file(path.clone())?,
        None => Config::new()?,
    };

    if let Some(url) = cli.common.url {
        config.backend.url = url;
        config.validate()?;
    }

    // Initialize logging
    let _guard = setup_logging(&config.logging)?;

    match &cli.common.config {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("Loaded layered config from {}/", Config::CONFIG_DIR),
    }

    // Create and run the app
    let app = Arc::new(StatsApp::new(config)?);
    let handle = tokio::spawn(Arc::clone(&app).run(WsConnector::new()));

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");

    app.shutdown().await?;

    match handle.await {
        Ok(Err(e)) => error!("Stats app failed: {}", e),
        Err(e) => error!("Stats app task panicked: {}", e),
        Ok(Ok(())) => {}
    }

    Ok(())
}
