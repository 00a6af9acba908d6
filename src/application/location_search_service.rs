use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::application::debounce::{Debouncer, DEFAULT_QUIET_INTERVAL};
use crate::domain::{LocationRecord, LocationSearchResult, SearchQuery};
use crate::ports::in_ports::LocationSearchPort;
use crate::ports::out_ports::{FetchOutcome, FetchTicket, LocationEndpointPort, QueryCachePort};

/// Application service implementing the cache-aware location search resource
///
/// Serves cached data immediately and revalidates it in the background.
/// Fetches are deduplicated per query key through the cache capability, so
/// concurrent interest in one key costs one network call.
pub struct LocationSearchService {
    endpoint: Arc<dyn LocationEndpointPort + Send + Sync>,
    cache: Arc<dyn QueryCachePort + Send + Sync>,
    quiet_interval: Duration,
}

impl LocationSearchService {
    pub fn new(
        endpoint: Arc<dyn LocationEndpointPort + Send + Sync>,
        cache: Arc<dyn QueryCachePort + Send + Sync>,
    ) -> Self {
        Self::with_quiet_interval(endpoint, cache, DEFAULT_QUIET_INTERVAL)
    }

    pub fn with_quiet_interval(
        endpoint: Arc<dyn LocationEndpointPort + Send + Sync>,
        cache: Arc<dyn QueryCachePort + Send + Sync>,
        quiet_interval: Duration,
    ) -> Self {
        Self {
            endpoint,
            cache,
            quiet_interval,
        }
    }

    /// Run the deduplicated fetch for a query and settle it into the cache
    async fn revalidate(
        endpoint: Arc<dyn LocationEndpointPort + Send + Sync>,
        cache: Arc<dyn QueryCachePort + Send + Sync>,
        query: SearchQuery,
    ) -> FetchOutcome {
        let key = query.cache_key();

        match cache.begin_fetch(&key).await {
            FetchTicket::Follower(mut outcome) => {
                debug!(key = %key, "joining in-flight fetch");
                match outcome.recv().await {
                    Ok(settled) => settled,
                    Err(_) => Err(crate::domain::LocationError::FetchAbandoned),
                }
            }
            FetchTicket::Leader(lease) => {
                debug!(key = %key, "fetching locations");
                let outcome = endpoint
                    .fetch_locations(&query)
                    .await
                    .map(|envelope| envelope.entries);

                if let Err(error) = &outcome {
                    warn!(key = %key, %error, "location fetch failed");
                }

                cache.complete_fetch(&key, outcome.clone()).await;
                lease.settle();
                outcome
            }
        }
    }

    /// Spawn a revalidation that outlives the caller's interest
    ///
    /// Superseded fetches complete silently into the shared cache for later
    /// reuse.
    fn spawn_revalidation(
        &self,
        query: SearchQuery,
    ) -> tokio::task::JoinHandle<FetchOutcome> {
        let endpoint = self.endpoint.clone();
        let cache = self.cache.clone();
        tokio::spawn(Self::revalidate(endpoint, cache, query))
    }

    async fn stale_data(&self, key: &str) -> Vec<LocationRecord> {
        match self.cache.get(key).await {
            Some(entry) => entry.data,
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl LocationSearchPort for LocationSearchService {
    async fn search(&self, query: SearchQuery) -> LocationSearchResult {
        let key = query.cache_key();
        let cached = self.cache.get(&key).await;
        self.spawn_revalidation(query);

        match cached {
            Some(entry) => LocationSearchResult::revalidating(entry.data),
            None => LocationSearchResult::first_load(),
        }
    }

    async fn refresh(&self, query: SearchQuery) -> LocationSearchResult {
        let key = query.cache_key();
        let outcome =
            Self::revalidate(self.endpoint.clone(), self.cache.clone(), query).await;

        let stale = match &outcome {
            Ok(_) => Vec::new(),
            Err(_) => self.stale_data(&key).await,
        };
        LocationSearchResult::settled(outcome, stale)
    }

    fn subscribe(
        &self,
        tag_filter: Option<String>,
        raw_text: watch::Receiver<String>,
    ) -> watch::Receiver<LocationSearchResult> {
        let debouncer = Debouncer::spawn(raw_text, self.quiet_interval);
        let mut debounced = debouncer.output();
        let (tx, rx) = watch::channel(LocationSearchResult::first_load());

        let endpoint = self.endpoint.clone();
        let cache = self.cache.clone();

        tokio::spawn(async move {
            // The debouncer's timer lives exactly as long as this loop.
            let _debouncer = debouncer;

            loop {
                let text = debounced.borrow_and_update().clone();
                let query = SearchQuery::new(tag_filter.clone(), text);
                let key = query.cache_key();

                let stale = match cache.get(&key).await {
                    Some(entry) => {
                        let data = entry.data.clone();
                        publish(&tx, LocationSearchResult::revalidating(entry.data));
                        data
                    }
                    None => {
                        publish(&tx, LocationSearchResult::first_load());
                        Vec::new()
                    }
                };
                if tx.is_closed() {
                    break;
                }

                let fetch = tokio::spawn(Self::revalidate(
                    endpoint.clone(),
                    cache.clone(),
                    query,
                ));

                tokio::select! {
                    joined = fetch => {
                        // A newer debounced value can be ready in the same
                        // poll; its key owns the display now, so the old
                        // key's settled state must not surface.
                        if !debounced.has_changed().unwrap_or(false) {
                            let outcome = joined
                                .unwrap_or(Err(crate::domain::LocationError::FetchAbandoned));
                            publish(&tx, LocationSearchResult::settled(outcome, stale));
                        }
                        if tx.is_closed() || debounced.changed().await.is_err() {
                            break;
                        }
                    }
                    changed = debounced.changed() => {
                        // Superseded: the fetch keeps running into the cache,
                        // but only the new key's state is observable.
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        rx
    }
}

/// Publish a projected result only when it differs from the current state
///
/// Equality-gated so subscribers are not woken for a recomputation that
/// changed neither data nor flags.
fn publish(tx: &watch::Sender<LocationSearchResult>, next: LocationSearchResult) {
    tx.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
