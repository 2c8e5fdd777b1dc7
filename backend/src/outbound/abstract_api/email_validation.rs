//! Email validation adapter.

use async_trait::async_trait;

use super::client::{AbstractApiClient, AbstractApiServiceConfig};
use super::dto::EmailValidationDto;
use crate::domain::EmailAddress;
use crate::domain::ports::{EmailValidationSource, ExternalSourceError};

/// Default endpoint of the email validation service.
pub const DEFAULT_EMAIL_VALIDATION_ENDPOINT: &str = "https://emailvalidation.abstractapi.com/v1/";

/// Email validation source backed by the hosted HTTP API.
pub struct HttpEmailValidationSource {
    client: AbstractApiClient,
}

impl HttpEmailValidationSource {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: AbstractApiServiceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: AbstractApiClient::new(config, "email_validation")?,
        })
    }
}

#[async_trait]
impl EmailValidationSource for HttpEmailValidationSource {
    async fn check_format(&self, email: &EmailAddress) -> Result<bool, ExternalSourceError> {
        let body = self.client.get(&[("email", email.to_string())]).await?;
        parse_validity(&body)
    }
}

fn parse_validity(body: &[u8]) -> Result<bool, ExternalSourceError> {
    let decoded: EmailValidationDto = serde_json::from_slice(body).map_err(|error| {
        ExternalSourceError::malformed_response(format!(
            "invalid email validation payload: {error}"
        ))
    })?;
    Ok(decoded.is_valid_format.value)
}
