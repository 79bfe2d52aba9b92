//! Masquerade
//!
//! Loads `masquerade.yaml`, seeds an in-memory host with its devices and
//! plugins, registers every masquerade device, then reads host events as
//! JSON lines. At end of input the state reported on every masquerade device
//! is printed as JSON.

mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use masq_config::{load_config, MasqueradeConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use session::Session;

/// Masquerade - present devices as other device types
#[derive(Parser, Debug)]
#[command(name = "masquerade")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "masquerade.yaml")]
    config: PathBuf,

    /// Read events from a file instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

fn init_tracing(config: &MasqueradeConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn run<R: AsyncBufRead + Unpin>(session: &Session, reader: R) -> Result<usize> {
    let mut lines = reader.lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await.context("Failed to read event")? {
        session.handle_line(&line);
        count += 1;
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    init_tracing(&config);

    info!(config = %args.config.display(), "Starting Masquerade");

    if args.check {
        let bindings = config.bindings()?;
        info!(bindings = bindings.len(), "Configuration is valid");
        return Ok(());
    }

    let session = Session::from_config(&config)?;

    let lines = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            run(&session, BufReader::new(file)).await?
        }
        None => run(&session, BufReader::new(tokio::io::stdin())).await?,
    };

    info!(lines, "End of input");
    if lines == 0 {
        warn!("No events received");
    }

    let reports = session.reports();
    println!("{}", serde_json::to_string_pretty(&reports)?);

    Ok(())
}
