use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::adapter::out_adapters::InMemoryQueryCache;
use crate::application::LocationSearchService;
use crate::domain::{
    LocationEnvelope, LocationRecord, LocationResult, LocationSearchResult, LocationStatus,
    SearchQuery,
};
use crate::ports::in_ports::LocationSearchPort;
use crate::ports::out_ports::{LocationEndpointPort, QueryCachePort};

/// Endpoint fake that records every cache key it is asked for and answers
/// with one location named after the query text
struct RecordingEndpoint {
    keys: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl RecordingEndpoint {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            keys: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationEndpointPort for RecordingEndpoint {
    async fn fetch_locations(&self, query: &SearchQuery) -> LocationResult<LocationEnvelope> {
        self.keys.lock().unwrap().push(query.cache_key());
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let name = if query.text().is_empty() {
            "Listing".to_string()
        } else {
            format!("Match for {}", query.text())
        };
        Ok(LocationEnvelope {
            entries: vec![LocationRecord {
                id: query.cache_key(),
                name,
                status: LocationStatus::Active,
                classification_tags: Vec::new(),
            }],
            total_count: 1,
        })
    }
}

/// Wait for the next published state with both loading flags cleared
async fn next_settled(
    results: &mut watch::Receiver<LocationSearchResult>,
) -> LocationSearchResult {
    loop {
        results.changed().await.expect("subscription ended");
        let current = results.borrow_and_update().clone();
        if !current.is_loading && !current.loading_new_data {
            return current;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn typing_settles_into_a_single_filtered_fetch() {
    let endpoint = RecordingEndpoint::new(Duration::ZERO);
    let cache = Arc::new(InMemoryQueryCache::new());
    let service = LocationSearchService::with_quiet_interval(
        endpoint.clone(),
        cache,
        Duration::from_millis(300),
    );

    let (input, raw_text) = watch::channel(String::new());
    let mut results = service.subscribe(None, raw_text);

    // The empty field fetches the capped unfiltered listing.
    let initial = next_settled(&mut results).await;
    assert_eq!(initial.locations[0].name, "Listing");

    // Three keystrokes inside the quiet interval.
    input.send("c".to_string()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    input.send("cl".to_string()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    input.send("cli".to_string()).unwrap();

    let settled = next_settled(&mut results).await;
    assert_eq!(settled.locations[0].name, "Match for cli");
    assert!(settled.error.is_none());

    // Only the final debounced value reached the network.
    let keys = endpoint.keys();
    assert_eq!(
        keys,
        vec![
            "_summary=data&_count=10".to_string(),
            "_summary=data&name:contains=cli".to_string(),
        ]
    );
    let filtered: Vec<&String> = keys.iter().filter(|k| k.contains("name:contains")).collect();
    assert_eq!(filtered, vec!["_summary=data&name:contains=cli"]);
}

#[tokio::test(start_paused = true)]
async fn tag_filter_rides_every_query() {
    let endpoint = RecordingEndpoint::new(Duration::ZERO);
    let cache = Arc::new(InMemoryQueryCache::new());
    let service = LocationSearchService::with_quiet_interval(
        endpoint.clone(),
        cache,
        Duration::from_millis(300),
    );

    let (input, raw_text) = watch::channel(String::new());
    let mut results = service.subscribe(Some("Login Location".to_string()), raw_text);

    next_settled(&mut results).await;
    input.send("ward".to_string()).unwrap();
    next_settled(&mut results).await;

    assert_eq!(
        endpoint.keys(),
        vec![
            "_summary=data&_count=10&_tag=Login Location".to_string(),
            "_summary=data&_tag=Login Location&name:contains=ward".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn new_input_supersedes_in_flight_fetch() {
    let endpoint = RecordingEndpoint::new(Duration::from_millis(1_000));
    let cache = Arc::new(InMemoryQueryCache::new());
    let service = LocationSearchService::with_quiet_interval(
        endpoint.clone(),
        cache.clone(),
        Duration::from_millis(300),
    );

    let (input, raw_text) = watch::channel("slow".to_string());
    let mut results = service.subscribe(None, raw_text);

    // Let the fetch for "slow" get into flight, then type past it.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    input.send("fast".to_string()).unwrap();

    let settled = next_settled(&mut results).await;
    assert_eq!(settled.locations[0].name, "Match for fast");

    // The superseded fetch still completed into the shared cache.
    let slow_key = SearchQuery::new(None, "slow").cache_key();
    let entry = cache.get(&slow_key).await.expect("abandoned fetch cached");
    assert_eq!(entry.data[0].name, "Match for slow");
}

#[tokio::test(start_paused = true)]
async fn superseded_settlement_never_reaches_the_subscriber() {
    let endpoint = RecordingEndpoint::new(Duration::from_millis(300));
    let cache = Arc::new(InMemoryQueryCache::new());
    let service = LocationSearchService::with_quiet_interval(
        endpoint.clone(),
        cache.clone(),
        Duration::from_millis(300),
    );

    let (input, raw_text) = watch::channel("slow".to_string());
    let mut results = service.subscribe(None, raw_text);

    // The fetch for "slow" and the debounced emission of "fast" both come
    // due 300ms in; whichever the loop sees first, only "fast" states may
    // surface.
    input.send("fast".to_string()).unwrap();

    loop {
        results.changed().await.unwrap();
        let current = results.borrow_and_update().clone();
        assert!(current
            .locations
            .iter()
            .all(|loc| loc.name != "Match for slow"));
        if !current.loading_new_data && !current.locations.is_empty() {
            assert_eq!(current.locations[0].name, "Match for fast");
            break;
        }
    }

    // The superseded fetch still settled silently into the shared cache.
    let slow_key = SearchQuery::new(None, "slow").cache_key();
    let entry = cache.get(&slow_key).await.expect("superseded fetch cached");
    assert_eq!(entry.data[0].name, "Match for slow");
}

#[tokio::test(start_paused = true)]
async fn two_subscribers_on_one_key_share_one_fetch() {
    let endpoint = RecordingEndpoint::new(Duration::from_millis(10));
    let cache = Arc::new(InMemoryQueryCache::new());
    let service = LocationSearchService::with_quiet_interval(
        endpoint.clone(),
        cache,
        Duration::from_millis(300),
    );

    let (_input_a, raw_a) = watch::channel("ward".to_string());
    let (_input_b, raw_b) = watch::channel("ward".to_string());
    let mut results_a = service.subscribe(None, raw_a);
    let mut results_b = service.subscribe(None, raw_b);

    let settled_a = next_settled(&mut results_a).await;
    let settled_b = next_settled(&mut results_b).await;

    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
    assert_eq!(settled_a.locations, settled_b.locations);
}

#[tokio::test(start_paused = true)]
async fn resubscribing_serves_cached_data_before_revalidation() {
    let endpoint = RecordingEndpoint::new(Duration::from_millis(10));
    let cache = Arc::new(InMemoryQueryCache::new());
    let service = LocationSearchService::with_quiet_interval(
        endpoint.clone(),
        cache,
        Duration::from_millis(300),
    );

    let (_input, raw_text) = watch::channel("ward".to_string());
    let mut first = service.subscribe(None, raw_text);
    let settled = next_settled(&mut first).await;
    drop(first);

    // A fresh subscriber for the same key sees cached data immediately,
    // flagged as revalidating, before the background fetch settles.
    let (_input2, raw_text2) = watch::channel("ward".to_string());
    let mut second = service.subscribe(None, raw_text2);

    let mut saw_revalidating = false;
    loop {
        let current = second.borrow_and_update().clone();
        if current.loading_new_data && !current.is_loading {
            assert_eq!(current.locations, settled.locations);
            saw_revalidating = true;
        }
        if !current.loading_new_data && !current.locations.is_empty() {
            break;
        }
        second.changed().await.unwrap();
    }

    assert!(saw_revalidating);
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 2);
}
