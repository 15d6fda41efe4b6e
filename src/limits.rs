//! Concurrency budgets: the global gate capacities and the per-origin
//! limiter registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::{Origin, Url};

/// Feeds being downloaded and parsed at once.
pub const MAX_CONCURRENT_FEEDS: usize = 8;
/// Articles being fetched and tokenized at once, process-wide.
pub const MAX_CONCURRENT_ARTICLES: usize = 64;
/// Concurrent article fetches against any single origin server.
pub const MAX_PER_ORIGIN: usize = 12;

/// The `scheme://host[:port]` identity of `raw`, with the host lowercased
/// and default ports elided. `None` when the URL does not parse or has no
/// host to rate-limit against.
pub fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    match url.origin() {
        origin @ Origin::Tuple(..) => Some(origin.ascii_serialization()),
        Origin::Opaque(_) => None,
    }
}

/// Lazily grown map from origin to its counting gate. Limiters are created
/// on an origin's first appearance and live until the end of the run.
///
/// The registry lock covers only map access; waiting for a slot happens on
/// the origin's own semaphore after the lock is released.
#[derive(Debug, Default)]
pub struct OriginLimiters {
    limiters: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl OriginLimiters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve one fetch slot against `origin`, blocking while the origin is
    /// saturated. The returned permit is the slot; dropping it releases.
    pub async fn acquire(&self, origin: &str) -> OwnedSemaphorePermit {
        let limiter = {
            let mut limiters = self
                .limiters
                .lock()
                .expect("limiter registry lock poisoned");
            Arc::clone(
                limiters
                    .entry(origin.to_string())
                    .or_insert_with(|| Arc::new(Semaphore::new(MAX_PER_ORIGIN))),
            )
        };
        limiter.acquire_owned().await.expect("origin limiter closed")
    }
}
