//! batchelor - run a batch of HTTP requests from the command line
//!
//! # Usage
//!
//! ```bash
//! # Batch from a file, config from a YAML file
//! batchelor --config batchelor.yaml --input batch.json
//!
//! # Batch on stdin, config from BATCHELOR_* environment variables
//! # (variables also override values from a config file)
//! echo '[{"name":"a","url":"https://example.com"}]' | batchelor --max-concurrency 4
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr.

use anyhow::Context;
use batchelor_rs::utils::logging::{LogFormat, init_tracing};
use batchelor_rs::{BatchInput, Batcher, BatcherConfig};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "batchelor")]
#[command(version, about = "Issue a batch of named HTTP requests", long_about = None)]
struct Args {
    /// Configuration file (YAML or JSON). BATCHELOR_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Batch file: one request object or an array of them. Reads stdin if omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Maximum requests in flight
    #[arg(short = 'n', long)]
    max_concurrency: Option<usize>,

    /// Include raw response headers as `originalHeader`
    #[arg(long)]
    original_header: bool,

    /// Log filter, e.g. `debug` or `batchelor_rs=trace`. Overrides RUST_LOG
    #[arg(long, env = "BATCHELOR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

async fn load_config(args: &Args) -> anyhow::Result<BatcherConfig> {
    let env = BatcherConfig::from_env().context("loading config from environment")?;
    let mut config = match &args.config {
        Some(path) => BatcherConfig::from_file(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()))?
            .merge(env),
        None => env,
    };

    if let Some(limit) = args.max_concurrency {
        config.max_concurrent_batches = limit;
    }
    if args.original_header {
        config.original_header = true;
    }
    Ok(config)
}

async fn read_input(path: Option<&PathBuf>) -> anyhow::Result<BatchInput> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading batch from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("reading batch from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&raw).context("parsing batch JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.log_level.as_deref(), args.log_format)?;

    let config = load_config(&args).await?;
    debug!(?config, "Configuration resolved");

    let input = read_input(args.input.as_ref()).await?;
    let batcher = Batcher::new(config)?;

    let results = batcher.issue_calls(input).await.context("batch aborted")?;
    info!(results = results.len(), "Batch finished");

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
