pub mod debounce;
pub mod location_search_service;

pub use debounce::Debouncer;
pub use location_search_service::LocationSearchService;
