pub mod location_search_port;

pub use location_search_port::LocationSearchPort;
