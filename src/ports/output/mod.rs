pub mod location_endpoint_port;
pub mod query_cache_port;

pub use location_endpoint_port::LocationEndpointPort;
pub use query_cache_port::{FetchLease, FetchOutcome, FetchTicket, QueryCachePort};
