use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::domain::CacheEntry;
use crate::ports::out_ports::{FetchLease, FetchOutcome, FetchTicket, QueryCachePort};

/// How many settled outcomes a follower can lag behind before missing one.
/// One fetch produces one outcome, so a small buffer is plenty.
const OUTCOME_CHANNEL_CAPACITY: usize = 4;

/// One fetch currently in flight for a key
///
/// The generation lets a leader's drop guard release only its own claim: a
/// stale guard firing late must not evict a newer fetch for the same key.
struct InFlightFetch {
    generation: u64,
    sender: broadcast::Sender<FetchOutcome>,
}

/// In-memory implementation of the shared query cache
///
/// One instance is shared (via `Arc`) by every search resource in the
/// process. Concurrent readers never block each other beyond the short map
/// lock; writes for a key are single-writer-at-a-time because only the
/// fetch leader for that key ever calls [`QueryCachePort::complete_fetch`].
pub struct InMemoryQueryCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<String, InFlightFetch>>>,
    generation: AtomicU64,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Build the leader's drop guard for one claimed fetch slot
    fn lease_for(&self, key: &str, generation: u64) -> FetchLease {
        let in_flight = Arc::clone(&self.in_flight);
        let entries = Arc::clone(&self.entries);
        let key = key.to_string();

        FetchLease::new(move || {
            {
                let mut slots = in_flight.lock().unwrap();
                match slots.get(&key) {
                    Some(slot) if slot.generation == generation => {
                        // Dropping the sender resolves every follower.
                        slots.remove(&key);
                    }
                    _ => return,
                }
            }
            if let Some(entry) = entries.lock().unwrap().get_mut(&key) {
                entry.is_revalidating = false;
            }
        })
    }
}

impl Default for InMemoryQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryCachePort for InMemoryQueryCache {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).cloned()
    }

    async fn begin_fetch(&self, key: &str) -> FetchTicket {
        let generation = {
            let mut in_flight = self.in_flight.lock().unwrap();

            if let Some(slot) = in_flight.get(key) {
                return FetchTicket::Follower(slot.sender.subscribe());
            }

            let generation = self.generation.fetch_add(1, Ordering::Relaxed);
            let (sender, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
            in_flight.insert(key.to_string(), InFlightFetch { generation, sender });
            generation
        };

        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            entry.is_revalidating = true;
        }
        drop(entries);

        FetchTicket::Leader(self.lease_for(key, generation))
    }

    async fn complete_fetch(&self, key: &str, outcome: FetchOutcome) {
        {
            let mut entries = self.entries.lock().unwrap();
            match &outcome {
                Ok(data) => {
                    entries.insert(
                        key.to_string(),
                        CacheEntry {
                            key: key.to_string(),
                            data: data.clone(),
                            fetched_at: Utc::now(),
                            is_revalidating: false,
                        },
                    );
                }
                Err(_) => {
                    // Stale data beats no data for a transient failure.
                    if let Some(entry) = entries.get_mut(key) {
                        entry.is_revalidating = false;
                    }
                }
            }
        }

        let slot = self.in_flight.lock().unwrap().remove(key);
        if let Some(slot) = slot {
            // No followers is fine; the leader already has the outcome.
            let _ = slot.sender.send(outcome);
        }
    }

    async fn is_validating(&self, key: &str) -> bool {
        self.in_flight.lock().unwrap().contains_key(key)
    }
}
