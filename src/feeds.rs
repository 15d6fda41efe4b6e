//! Feed-list and feed collaborators: fetch an RSS document and extract the
//! `(title, link)` records its entries carry.

use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::errors::IngestError;
use crate::index::Article;

/// One feed named by the feed list.
#[derive(Debug, Clone)]
pub struct FeedSpec {
    pub title: String,
    pub url: String,
}

/// Fetch & parse the feed list at `url`: a catalog document whose entries
/// name the feeds to aggregate.
pub async fn fetch_feed_list(client: &Client, url: &str) -> Result<Vec<FeedSpec>, IngestError> {
    Ok(fetch_entries(client, url)
        .await?
        .into_iter()
        .map(|(title, link)| FeedSpec { title, url: link })
        .collect())
}

/// Fetch & parse the feed at `url` into the articles it references.
pub async fn fetch_feed(client: &Client, url: &str) -> Result<Vec<Article>, IngestError> {
    Ok(fetch_entries(client, url)
        .await?
        .into_iter()
        .map(|(title, link)| Article { title, url: link })
        .collect())
}

/// Shared fetch+parse path: both the feed list and individual feeds are RSS
/// documents whose entries reduce to a title and a first link. Entries
/// missing either are unusable and skipped.
async fn fetch_entries(client: &Client, url: &str) -> Result<Vec<(String, String)>, IngestError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| IngestError::Fetch(url.to_string(), e))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| IngestError::Fetch(url.to_string(), e))?;

    let feed = parser::parse(&bytes[..]).map_err(|e| IngestError::Parse(url.to_string(), e))?;

    let mut records = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let title = entry.title.map(|t| t.content).unwrap_or_default();
        let link = entry
            .links
            .into_iter()
            .next()
            .map(|l| l.href)
            .unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            debug!(feed = url, "Skipping entry without a title or link");
            continue;
        }
        records.push((title, link));
    }
    Ok(records)
}
