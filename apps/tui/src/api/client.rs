use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::models::Record;
use crate::domain::FilterState;

/// Fetch failure taxonomy. There is deliberately no retry and no
/// client-side timeout; callers log the error and keep stale data.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("decoding response from {url} failed: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Thin client over the backend's single data endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One GET with the entire filter state as query parameters. Empty
    /// values are sent as-is; the backend reads them as "no constraint".
    pub async fn fetch_records(&self, filters: &FilterState) -> Result<Vec<Record>, ApiError> {
        let start = std::time::Instant::now();
        debug!("Fetching records - active_filters={}", filters.active_count());

        let response = self
            .http
            .get(&self.endpoint)
            .query(&filters.query_params())
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Record fetch rejected - status={status}");
            return Err(ApiError::Status {
                url: self.endpoint.clone(),
                status,
            });
        }

        let records: Vec<Record> =
            response
                .json()
                .await
                .map_err(|source| ApiError::Decode {
                    url: self.endpoint.clone(),
                    source,
                })?;

        info!(
            "Record fetch completed - records={}, duration={:.2}s",
            records.len(),
            start.elapsed().as_secs_f32()
        );

        Ok(records)
    }
}
