//! The ingestion pipeline: the feed list fans out into feed workers, each
//! feed fans out into article workers, and everything merges into one shared
//! index.
//!
//! Three budgets bound the run: at most [`MAX_CONCURRENT_FEEDS`] feeds being
//! parsed, at most [`MAX_CONCURRENT_ARTICLES`] articles being tokenized
//! process-wide, and at most [`limits::MAX_PER_ORIGIN`] fetches in flight
//! against any one origin server.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{error, info, warn};

use crate::errors::IngestError;
use crate::feeds::{self, FeedSpec};
use crate::html;
use crate::index::{Article, TokenIndex};
use crate::limits::{self, OriginLimiters, MAX_CONCURRENT_ARTICLES, MAX_CONCURRENT_FEEDS};

/// Everything the workers share for the duration of one run.
struct IngestContext {
    client: Client,
    index: TokenIndex,
    article_gate: Arc<Semaphore>,
    origins: OriginLimiters,
}

/// Fetch the feed list at `feed_list_url`, aggregate every article it
/// transitively names, and return the populated index.
///
/// A feed-list failure is the one fatal error. Failures inside any single
/// feed or article are logged and absorbed, leaving a partial index.
pub async fn aggregate(client: &Client, feed_list_url: &str) -> Result<TokenIndex, IngestError> {
    let started = Instant::now();

    let feeds = feeds::fetch_feed_list(client, feed_list_url).await?;
    info!(url = %feed_list_url, feeds = feeds.len(), "Feed list parsed");

    let ctx = Arc::new(IngestContext {
        client: client.clone(),
        index: TokenIndex::new(),
        article_gate: Arc::new(Semaphore::new(MAX_CONCURRENT_ARTICLES)),
        origins: OriginLimiters::new(),
    });
    let feed_gate = Arc::new(Semaphore::new(MAX_CONCURRENT_FEEDS));

    let mut workers = FuturesUnordered::new();
    for feed in feeds {
        let feed_slot = feed_gate
            .clone()
            .acquire_owned()
            .await
            .expect("feed gate closed");
        workers.push(tokio::spawn(feed_worker(Arc::clone(&ctx), feed, feed_slot)));
    }

    let mut indexed = 0usize;
    let mut failed = 0usize;
    while let Some(joined) = workers.next().await {
        match joined {
            Ok((ok, bad)) => {
                indexed += ok;
                failed += bad;
            }
            Err(e) => {
                failed += 1;
                error!(error = %e, "Feed worker aborted");
            }
        }
    }

    info!(
        articles = indexed,
        failures = failed,
        tokens = ctx.index.token_count(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "Ingestion complete"
    );

    let ctx = Arc::into_inner(ctx).expect("ingestion workers still running");
    Ok(ctx.index)
}

/// Downloads one feed, then fans out one article worker per article and
/// awaits them all. Returns `(indexed, failed)` article counts.
///
/// The feed-gate slot is held only until the feed itself has been parsed, so
/// the next feed can start parsing while this one's articles download.
async fn feed_worker(
    ctx: Arc<IngestContext>,
    feed: FeedSpec,
    feed_slot: OwnedSemaphorePermit,
) -> (usize, usize) {
    info!(feed = %feed.title, url = %feed.url, "Begin feed download");

    let articles = match feeds::fetch_feed(&ctx.client, &feed.url).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(url = %feed.url, error = %e, "Failed to fetch feed");
            return (0, 1);
        }
    };
    drop(feed_slot);

    let mut failed = 0usize;
    let mut workers = FuturesUnordered::new();
    for article in articles {
        let Some(origin) = limits::origin_of(&article.url) else {
            warn!(url = %article.url, "Skipping article with no fetchable origin");
            failed += 1;
            continue;
        };
        // Reserving the origin slot in the parent bounds the number of
        // launched-but-waiting article workers per origin.
        let origin_slot = ctx.origins.acquire(&origin).await;
        workers.push(tokio::spawn(article_worker(
            Arc::clone(&ctx),
            article,
            origin_slot,
        )));
    }

    let mut indexed = 0usize;
    while let Some(joined) = workers.next().await {
        match joined {
            Ok(true) => indexed += 1,
            Ok(false) => failed += 1,
            Err(e) => {
                failed += 1;
                error!(error = %e, "Article worker aborted");
            }
        }
    }

    info!(feed = %feed.title, url = %feed.url, indexed, failed, "End feed download");
    (indexed, failed)
}

/// Tokenizes one article and merges it into the index. Returns whether the
/// article made it in.
///
/// The worker owns its origin slot from the moment it starts; that slot and
/// the article-gate slot are both released on every exit path when the
/// permits drop.
async fn article_worker(
    ctx: Arc<IngestContext>,
    article: Article,
    origin_slot: OwnedSemaphorePermit,
) -> bool {
    let _origin_slot = origin_slot;
    let _article_slot = ctx
        .article_gate
        .clone()
        .acquire_owned()
        .await
        .expect("article gate closed");

    info!(title = %article.title, url = %article.url, "Parsing article");

    match html::fetch_tokens(&ctx.client, &article.url).await {
        Ok(tokens) => {
            ctx.index.add(&article, &tokens);
            true
        }
        Err(e) => {
            error!(url = %article.url, error = %e, "Failed to fetch article");
            false
        }
    }
}
