use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::LocationError;

/// Lifecycle status of an organizational location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    Active,
    Inactive,
}

/// An organizational location record (e.g. a facility or ward)
///
/// Immutable snapshot as received from the remote endpoint; never mutated
/// locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Remote identifier for this location
    pub id: String,

    /// Display name of the location
    pub name: String,

    /// Whether the location is currently in use
    pub status: LocationStatus,

    /// Classification tags attached to this location
    #[serde(default)]
    pub classification_tags: Vec<String>,
}

/// Response envelope returned by the remote search endpoint
///
/// The remote service sends additional metadata (resource type, paging links,
/// last-updated stamps) alongside these fields; anything not modeled here is
/// ignored during deserialization. An envelope without an entry list projects
/// to an empty result rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEnvelope {
    #[serde(default)]
    pub entries: Vec<LocationRecord>,

    #[serde(default)]
    pub total_count: u64,
}

/// A cached response for one canonical query key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Canonical query key this entry was fetched for
    pub key: String,

    /// Location records, in the order the endpoint returned them
    pub data: Vec<LocationRecord>,

    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,

    /// Whether a revalidation fetch for this key is currently in flight
    pub is_revalidating: bool,
}

/// The consumer-facing result shape
///
/// `is_loading` is true only while no data exists yet for the current key
/// (first load); `loading_new_data` is true while any fetch for the current
/// key is in flight, including background revalidation of cached data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSearchResult {
    pub locations: Vec<LocationRecord>,
    pub is_loading: bool,
    pub loading_new_data: bool,
    pub error: Option<LocationError>,
}

impl LocationSearchResult {
    /// State published before anything is known about the current key
    pub fn first_load() -> Self {
        Self {
            locations: Vec::new(),
            is_loading: true,
            loading_new_data: true,
            error: None,
        }
    }

    /// Cached data served immediately while a revalidation is in flight
    pub fn revalidating(locations: Vec<LocationRecord>) -> Self {
        Self {
            locations,
            is_loading: false,
            loading_new_data: true,
            error: None,
        }
    }

    /// Settled state after a fetch completed
    ///
    /// On failure, `locations` carries whatever was previously cached for the
    /// key; stale data stays visible instead of vanishing behind a transient
    /// error.
    pub fn settled(outcome: Result<Vec<LocationRecord>, LocationError>, stale: Vec<LocationRecord>) -> Self {
        match outcome {
            Ok(locations) => Self {
                locations,
                is_loading: false,
                loading_new_data: false,
                error: None,
            },
            Err(error) => Self {
                locations: stale,
                is_loading: false,
                loading_new_data: false,
                error: Some(error),
            },
        }
    }
}
