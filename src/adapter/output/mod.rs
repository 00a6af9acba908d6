pub mod http_location_endpoint;
pub mod memory_query_cache;

pub use http_location_endpoint::HttpLocationEndpoint;
pub use memory_query_cache::InMemoryQueryCache;
