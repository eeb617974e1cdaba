//! epitrack server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `EPITRACK_*`
//! environment overrides, then serves the JSON API over HTTP. The dataset is
//! downloaded lazily on the first request and refreshed once the cache TTL
//! runs out.
//!
//! # Checking a source
//!
//! To download and clean the dataset once, print what was built and exit:
//!
//! ```
//! cargo run -p epitrack-server -- --check
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use epitrack_core::pipeline::Pipeline;
use epitrack_fetch::{FallbackSource, TableProvider};
use epitrack_server::{CheckReport, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Epidemiological time-series server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load the dataset once, print the clean report and summary as JSON and
  /// exit.
  #[arg(long)]
  check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg: ServerConfig = epitrack_server::load_config(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let source = FallbackSource::new(server_cfg.source.clone())
    .context("failed to build HTTP client")?;
  tracing::debug!(locations = ?source.locations(), "configured source");

  let provider = Arc::new(TableProvider::new(
    source,
    Pipeline::new(server_cfg.pipeline.clone()),
    Arc::new(server_cfg.cache.build()),
  ));

  if cli.check {
    let refresh = provider.refresh().await.context("failed to load dataset")?;
    let report = CheckReport::from(refresh);
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  let app = epitrack_server::router(provider);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
