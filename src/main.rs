//! Entrypoint: set up tracing, parse the command line, run the ingestion
//! pipeline to completion, and hand the populated index to the interactive
//! query loop.
//!
//! **Workflow**:
//! 1. Initialise tracing/logging from `RUST_LOG` (or default to `info`).
//! 2. Parse the single positional argument: the feed-list URI.
//! 3. Build one shared HTTP client with a 30-second request timeout.
//! 4. Aggregate: feed list → feeds → articles → inverted index. A feed-list
//!    failure is fatal; anything smaller is logged and absorbed.
//! 5. Answer token queries until a blank line.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use news_aggregator::ingest;
use news_aggregator::query;

/// Build an in-memory inverted index over every article reachable from an
/// RSS feed list, then query it interactively by token.
#[derive(Parser, Debug)]
#[command(name = "news_aggregator")]
struct Args {
    /// URI of the RSS feed list to aggregate
    feed_list: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!(url = %args.feed_list, "Starting news aggregation");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("news_aggregator/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build the HTTP client")?;

    let index = ingest::aggregate(&client, &args.feed_list)
        .await
        .with_context(|| format!("could not aggregate feed list {}", args.feed_list))?;

    query::run(&index).context("query loop failed")?;
    Ok(())
}
