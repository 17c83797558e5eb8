//! Out-of-band enrichment: image dimensions and symbol metadata.
//!
//! A session never performs I/O. It queues requests tagged with its [`SessionToken`]; the host
//! fetches them however it likes and hands the responses back. A response is applied only if its
//! token still names a live session and its node still exists.

use futures::future::join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Fetch the SVG at `url` to size `node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    pub token: SessionToken,
    pub node_id: String,
    pub url: String,
}

/// Fetch metadata for the `csymbol` node `node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLookup {
    pub token: SessionToken,
    pub node_id: String,
    pub symbol: String,
    pub url: String,
}

/// Resolves image requests concurrently; results keep request order.
pub async fn resolve_images<F, Fut, E>(
    requests: Vec<ImageRequest>,
    fetch: F,
) -> Vec<(ImageRequest, Result<String, E>)>
where
    F: Fn(&ImageRequest) -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    let results = join_all(requests.iter().map(&fetch)).await;
    requests.into_iter().zip(results).collect()
}

/// Resolves symbol lookups concurrently; results keep request order.
pub async fn resolve_symbols<F, Fut, E>(
    lookups: Vec<SymbolLookup>,
    fetch: F,
) -> Vec<(SymbolLookup, Result<String, E>)>
where
    F: Fn(&SymbolLookup) -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    let results = join_all(lookups.iter().map(&fetch)).await;
    lookups.into_iter().zip(results).collect()
}
