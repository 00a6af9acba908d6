use crate::domain::{LocationEnvelope, LocationResult, SearchQuery};
use async_trait::async_trait;

/// Output port for the remote read-only location search endpoint
///
/// Transport, authentication and timeout policy live behind this port; the
/// orchestrator only sees an envelope or a `LocationError`.
#[async_trait]
pub trait LocationEndpointPort {
    /// Execute a search against the remote endpoint
    async fn fetch_locations(&self, query: &SearchQuery) -> LocationResult<LocationEnvelope>;
}
