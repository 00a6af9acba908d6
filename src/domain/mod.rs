pub mod error;
pub mod model;
pub mod query;

pub use error::{LocationError, LocationResult};
pub use model::{
    CacheEntry, LocationEnvelope, LocationRecord, LocationSearchResult, LocationStatus,
};
pub use query::SearchQuery;
