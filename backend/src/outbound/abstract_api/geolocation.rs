//! IP geolocation adapter.

use std::net::IpAddr;

use async_trait::async_trait;

use super::client::{AbstractApiClient, AbstractApiServiceConfig};
use super::dto::GeolocationDto;
use crate::domain::ports::{ExternalSourceError, GeoLocation, GeolocationSource};

/// Default endpoint of the IP geolocation service.
pub const DEFAULT_GEOLOCATION_ENDPOINT: &str = "https://ipgeolocation.abstractapi.com/v1/";

/// Geolocation source backed by the hosted HTTP API.
pub struct HttpGeolocationSource {
    client: AbstractApiClient,
}

impl HttpGeolocationSource {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: AbstractApiServiceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: AbstractApiClient::new(config, "geolocation")?,
        })
    }
}

#[async_trait]
impl GeolocationSource for HttpGeolocationSource {
    async fn locate(&self, ip: IpAddr) -> Result<GeoLocation, ExternalSourceError> {
        let body = self.client.get(&[("ip_address", ip.to_string())]).await?;
        parse_location(&body)
    }
}

fn parse_location(body: &[u8]) -> Result<GeoLocation, ExternalSourceError> {
    let decoded: GeolocationDto = serde_json::from_slice(body).map_err(|error| {
        ExternalSourceError::malformed_response(format!("invalid geolocation payload: {error}"))
    })?;
    decoded
        .into_domain()
        .map_err(ExternalSourceError::malformed_response)
}
