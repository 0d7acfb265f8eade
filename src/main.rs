mod app;
mod config;
mod data;
mod error;
mod pipeline;
mod ui;

use app::App;
use clap::Parser;
use data::{DataFetcher, YahooProvider};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tickerview", about = "Terminal dashboard for US tech stock prices")]
struct Args {
    /// Settings file (defaults to .tickerview.json in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "tickerview.log")]
    log_file: PathBuf,

    /// Market-data endpoint, e.g. a local mirror of the Yahoo chart API
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args.log_file)?;

    let config_path = args.config.unwrap_or_else(config::config_path);
    let mut cfg = config::load_config(&config_path);
    if let Some(base_url) = args.base_url {
        cfg.base_url = base_url;
    }

    tracing::info!(config = %config_path.display(), base_url = %cfg.base_url, "starting");
    let provider = YahooProvider::new(cfg.base_url.clone())?;
    let fetcher = DataFetcher::new(Arc::new(provider));

    App::new(cfg, config_path, fetcher)?.run().await
}

fn init_tracing(path: &Path) -> color_eyre::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
