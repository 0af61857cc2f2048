mod handlers;
mod jobs;
mod server;

use anyhow::Result;
use clap::Parser;
use mashup_core::Config;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mashup-web")]
#[command(author, version, about = "Web service for building singer mashups")]
struct Cli {
    /// Bind address (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Worker tasks processing queued jobs (overrides config)
    #[arg(long)]
    workers: Option<usize>,

    /// Directory for finished mashups
    #[arg(long, default_value = "mashup-output")]
    output_dir: PathBuf,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "mashup_web=info,mashup_core=info",
        1 => "mashup_web=debug,mashup_core=debug,tower_http=debug",
        2 => "mashup_web=trace,mashup_core=trace,tower_http=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());
    let workers = cli.workers.unwrap_or(config.server.workers).max(1);

    tokio::fs::create_dir_all(&cli.output_dir).await?;

    let (queue_tx, queue_rx) = mpsc::channel(64);
    let store = jobs::JobStore::new(queue_tx, cli.output_dir.clone());
    jobs::spawn_workers(workers, store.clone(), config, queue_rx);

    server::run(&bind, store).await
}
