use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::{LocationEnvelope, LocationError, LocationResult, SearchQuery};
use crate::ports::out_ports::LocationEndpointPort;

/// HTTP implementation of the remote location search endpoint
///
/// Sends the query's canonical parameters against `<base_url>/Location`.
/// Timeout policy belongs here, not in the orchestrator.
pub struct HttpLocationEndpoint {
    client: Client,
    base_url: String,
}

impl HttpLocationEndpoint {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> LocationResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| LocationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/Location", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LocationEndpointPort for HttpLocationEndpoint {
    async fn fetch_locations(&self, query: &SearchQuery) -> LocationResult<LocationEnvelope> {
        let url = self.search_url();
        debug!(%url, key = %query.cache_key(), "requesting locations");

        let response = self
            .client
            .get(&url)
            .query(&query.params())
            .send()
            .await
            .map_err(|err| LocationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::Transport(format!(
                "endpoint returned {status}"
            )));
        }

        response.json::<LocationEnvelope>().await.map_err(|err| {
            if err.is_decode() {
                LocationError::MalformedResponse(err.to_string())
            } else {
                LocationError::Transport(err.to_string())
            }
        })
    }
}
