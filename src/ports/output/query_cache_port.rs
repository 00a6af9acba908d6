use crate::domain::{CacheEntry, LocationError, LocationRecord};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Outcome of one fetch for one query key, shared with every waiter
pub type FetchOutcome = Result<Vec<LocationRecord>, LocationError>;

/// Ticket handed out when a caller wants to fetch a key
///
/// At most one `Leader` exists per key at a time; everyone else becomes a
/// `Follower` of that fetch's broadcast channel.
pub enum FetchTicket {
    /// This caller performs the network fetch, calls
    /// [`QueryCachePort::complete_fetch`] with the outcome, and then settles
    /// the lease.
    Leader(FetchLease),

    /// Another fetch for the same key is already in flight; await the
    /// broadcast outcome instead of issuing a second request.
    Follower(broadcast::Receiver<FetchOutcome>),
}

/// Drop guard for the leader's claim on a key's fetch slot
///
/// A leader future can be dropped mid-fetch (a consumer `select!` or
/// timeout); without a guard the in-flight entry would outlive it and every
/// later fetch for the key would follow a broadcast that never settles. If
/// the lease is dropped before [`FetchLease::settle`], the cache releases
/// the slot: followers resolve to an abandoned-fetch error and the next
/// caller leads.
pub struct FetchLease {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl FetchLease {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Disarm the guard after the fetch settled through `complete_fetch`
    pub fn settle(mut self) {
        self.release.take();
    }
}

impl Drop for FetchLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Output port for the shared query cache capability
///
/// Shared across all search resources in the process. Provides get-by-key,
/// set-by-key, the per-key validating flag, and in-flight request
/// deduplication.
#[async_trait]
pub trait QueryCachePort {
    /// Look up the cached entry for a key
    async fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Claim the fetch slot for a key, marking it as revalidating
    async fn begin_fetch(&self, key: &str) -> FetchTicket;

    /// Settle the in-flight fetch for a key
    ///
    /// A successful outcome replaces the cached data and timestamps the
    /// entry; a failed outcome leaves previously cached data intact. Either
    /// way the validating flag clears and every follower receives the
    /// outcome.
    async fn complete_fetch(&self, key: &str, outcome: FetchOutcome);

    /// Whether a fetch for the key is currently in flight
    async fn is_validating(&self, key: &str) -> bool;
}
