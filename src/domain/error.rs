use thiserror::Error;

/// Domain-specific errors for the location search resource.
///
/// Fetch failures are converted into a state signal at the orchestrator
/// boundary rather than propagated to the subscriber, so the type is
/// `Clone + PartialEq`: it rides the deduplication broadcast channel and the
/// published result state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("In-flight fetch was abandoned before settling")]
    FetchAbandoned,
}

/// Result type for location search operations
pub type LocationResult<T> = Result<T, LocationError>;
