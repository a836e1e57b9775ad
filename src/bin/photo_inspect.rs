// photo_inspect - inspect a selection of local files
// One invocation is one selection event: every path is processed, the batch
// is printed as a table (or JSON), and per-file failures go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use photo_inspect::config::{ENV_GEOCODING_KEY, GeocodingConfig};
use photo_inspect::summary::render_table;
use photo_inspect::{FilePipeline, InspectConfig, InspectSession};

#[derive(Parser)]
#[command(name = "photo_inspect", version, about = "Inspect image files: resolution, thumbnail, EXIF tags and location")]
struct Args {
    /// Files to inspect, in selection order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Thumbnail height in pixels
    #[arg(long)]
    thumbnail_size: Option<u32>,

    /// Files processed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Reverse geocoding API key (geocoding is skipped without one)
    #[arg(long, env = ENV_GEOCODING_KEY, hide_env_values = true)]
    geocoding_key: Option<String>,

    /// Print the batch as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print pipeline metrics after the batch
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = InspectConfig::from_env().context("Invalid environment configuration")?;
    if let Some(size) = args.thumbnail_size {
        config.thumbnail_max_dimension = size;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(key) = args.geocoding_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        let endpoint = config.geocoding.take().map(|g| g.endpoint);
        let geocoding = GeocodingConfig::new(key);
        config.geocoding = Some(match endpoint {
            Some(endpoint) => geocoding.with_endpoint(endpoint),
            None => geocoding,
        });
    }
    config.validate().context("Invalid configuration")?;

    info!(
        "Inspecting {} file(s), thumbnails {}px, geocoding {}",
        args.files.len(),
        config.thumbnail_max_dimension,
        if config.geocoding.is_some() { "enabled" } else { "disabled" }
    );

    let session = InspectSession::new(FilePipeline::new(config));
    let batch = session
        .select_paths(&args.files)
        .await
        .unwrap_or_else(|| session.current());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*batch).context("Failed to serialize batch")?);
    } else {
        println!("{}", render_table(&batch));
    }

    if args.metrics {
        let snapshot = session.pipeline().metrics().snapshot();
        eprintln!("{}", serde_json::to_string_pretty(&snapshot).context("Failed to serialize metrics")?);
    }

    Ok(())
}
