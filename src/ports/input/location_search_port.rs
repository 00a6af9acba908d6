use crate::domain::{LocationSearchResult, SearchQuery};
use async_trait::async_trait;
use tokio::sync::watch;

/// Input port for the debounced, cache-aware location search resource
#[async_trait]
pub trait LocationSearchPort {
    /// Resolve a query with stale-while-revalidate semantics
    ///
    /// Returns immediately: cached data (if any) with `loading_new_data`
    /// set, or the first-load state on a cache miss. A deduplicated fetch is
    /// started in the background and settles into the shared cache.
    async fn search(&self, query: SearchQuery) -> LocationSearchResult;

    /// Fetch (or join the in-flight fetch for) a query and await the settled
    /// result
    async fn refresh(&self, query: SearchQuery) -> LocationSearchResult;

    /// Subscribe to results for a stream of raw search text
    ///
    /// The raw text is debounced before it drives any fetch. The returned
    /// receiver always reflects the caller's current query: a new debounced
    /// value supersedes interest in the previous key's in-flight fetch,
    /// which still completes silently into the cache. The subscription ends
    /// when the input sender is dropped or the receiver is discarded.
    fn subscribe(
        &self,
        tag_filter: Option<String>,
        raw_text: watch::Receiver<String>,
    ) -> watch::Receiver<LocationSearchResult>;
}
