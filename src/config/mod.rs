use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for the location search resource
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Remote endpoint configuration
    pub endpoint: EndpointConfig,

    /// Search behavior configuration
    pub search: SearchConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the location search service
    pub base_url: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

/// Search behavior configuration
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    /// Quiet interval before typed text propagates, in milliseconds
    pub debounce_ms: u64,

    /// Result cap applied to unfiltered listings
    pub result_cap: usize,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with defaults
            .set_default("endpoint.base_url", "https://localhost/fhir2/R4")?
            .set_default("endpoint.request_timeout_ms", 10_000)?
            .set_default("search.debounce_ms", 300)?
            .set_default("search.result_cap", 10)?
            // Load from config file if it exists
            .add_source(File::from(Path::new("config/default.toml")).required(false))
            // Override with environment variables (e.g., LOCSEARCH_SEARCH__DEBOUNCE_MS=500)
            .add_source(Environment::with_prefix("LOCSEARCH").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl EndpointConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl SearchConfig {
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
