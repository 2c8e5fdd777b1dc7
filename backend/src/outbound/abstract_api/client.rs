//! Shared HTTP client for the hosted lookup APIs.
//!
//! This layer owns transport details only: the API key query parameter,
//! request timeout, and HTTP status mapping into [`ExternalSourceError`].

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::ExternalSourceError;

/// Secret API key for one hosted service.
///
/// The key is wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    pub(super) fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Endpoint, key, and timeout for one hosted service.
#[derive(Debug, Clone)]
pub struct AbstractApiServiceConfig {
    /// Base URL requests are sent to.
    pub endpoint: Url,
    /// Key passed as the `api_key` query parameter.
    pub api_key: ApiKey,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl AbstractApiServiceConfig {
    /// Build a config for `endpoint`.
    pub fn new(endpoint: Url, api_key: ApiKey, timeout: Duration) -> Self {
        Self {
            endpoint,
            api_key,
            timeout,
        }
    }
}

/// Thin GET-with-key client shared by the three adapters.
pub(super) struct AbstractApiClient {
    client: Client,
    endpoint: Url,
    api_key: ApiKey,
    service: &'static str,
}

impl AbstractApiClient {
    pub(super) fn new(
        config: AbstractApiServiceConfig,
        service: &'static str,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            service,
        })
    }

    /// Send a GET with `params` and return the body of a 2xx response.
    pub(super) async fn get(&self, params: &[(&str, String)]) -> Result<Vec<u8>, ExternalSourceError> {
        debug!(service = self.service, "calling external service");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("api_key", self.api_key.expose())])
            .query(params)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            debug!(service = self.service, status = status.as_u16(), "external service error status");
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

// reqwest errors embed the request URL, which carries the API key.
pub(super) fn map_transport_error(error: reqwest::Error) -> ExternalSourceError {
    let timed_out = error.is_timeout();
    let message = error.without_url().to_string();
    if timed_out {
        ExternalSourceError::timeout(message)
    } else {
        ExternalSourceError::transport(message)
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> ExternalSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        body_preview
    };

    // Only 5xx is retried; a 408 is still a client error.
    if status.is_server_error() {
        ExternalSourceError::server_error(status.as_u16(), message)
    } else {
        ExternalSourceError::client_error(status.as_u16(), message)
    }
}

pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
