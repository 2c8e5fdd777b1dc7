//! Application configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `SOCIAL_*` environment variables, and config
//! files. The request timeout carries a loader default; every other field is
//! optional and its accessor supplies the default, so a bare environment
//! still boots a local server.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::FixedRetryPolicy;
use crate::outbound::abstract_api::{
    AbstractApiServiceConfig, ApiKey, DEFAULT_EMAIL_VALIDATION_ENDPOINT,
    DEFAULT_GEOLOCATION_ENDPOINT, DEFAULT_HOLIDAYS_ENDPOINT,
};
use crate::outbound::queue::DEFAULT_QUEUE_CAPACITY;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised when settings hold unusable values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A value failed to parse.
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
    /// A required value is absent.
    #[error("missing required setting {field}")]
    Missing { field: &'static str },
}

/// Hosted services the backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalService {
    EmailValidation,
    Geolocation,
    Holidays,
}

impl ExternalService {
    fn key_field(self) -> &'static str {
        match self {
            Self::EmailValidation => "email_validation_api_key",
            Self::Geolocation => "geolocation_api_key",
            Self::Holidays => "holidays_api_key",
        }
    }

    fn endpoint_field(self) -> &'static str {
        match self {
            Self::EmailValidation => "email_validation_endpoint",
            Self::Geolocation => "geolocation_endpoint",
            Self::Holidays => "holidays_endpoint",
        }
    }

    fn default_endpoint(self) -> &'static str {
        match self {
            Self::EmailValidation => DEFAULT_EMAIL_VALIDATION_ENDPOINT,
            Self::Geolocation => DEFAULT_GEOLOCATION_ENDPOINT,
            Self::Holidays => DEFAULT_HOLIDAYS_ENDPOINT,
        }
    }
}

/// Top-level backend configuration.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SOCIAL")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; users are kept in memory when unset.
    pub database_url: Option<String>,
    /// API key for the email validation service.
    pub email_validation_api_key: Option<String>,
    /// API key for the IP geolocation service.
    pub geolocation_api_key: Option<String>,
    /// API key for the public holiday service.
    pub holidays_api_key: Option<String>,
    /// Endpoint override for the email validation service.
    pub email_validation_endpoint: Option<String>,
    /// Endpoint override for the IP geolocation service.
    pub geolocation_endpoint: Option<String>,
    /// Endpoint override for the public holiday service.
    pub holidays_endpoint: Option<String>,
    /// Timeout applied to every outbound request, in seconds.
    #[ortho_config(default = 10)]
    pub http_timeout_secs: u64,
    /// Attempts made against the validation and geolocation services.
    pub retry_attempts: Option<u32>,
    /// Pause between attempts, in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Enrichment jobs buffered before signups start dropping them.
    pub queue_capacity: Option<usize>,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &redact(&self.database_url))
            .field(
                "email_validation_api_key",
                &redact(&self.email_validation_api_key),
            )
            .field("geolocation_api_key", &redact(&self.geolocation_api_key))
            .field("holidays_api_key", &redact(&self.holidays_api_key))
            .field("email_validation_endpoint", &self.email_validation_endpoint)
            .field("geolocation_endpoint", &self.geolocation_endpoint)
            .field("holidays_endpoint", &self.holidays_endpoint)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                field: "bind_addr",
                message: err.to_string(),
            })
    }

    /// Timeout for outbound HTTP calls.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Retry policy shared by the validation and geolocation calls.
    pub fn retry_policy(&self) -> FixedRetryPolicy {
        let attempts = self
            .retry_attempts
            .unwrap_or(FixedRetryPolicy::DEFAULT_MAX_ATTEMPTS);
        let delay = self
            .retry_delay_ms
            .map_or(FixedRetryPolicy::DEFAULT_DELAY, Duration::from_millis);
        FixedRetryPolicy::new(attempts, delay)
    }

    /// Capacity of the in-process enrichment queue.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    /// Connection settings for `service`.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn service_config(
        &self,
        service: ExternalService,
    ) -> Result<Option<AbstractApiServiceConfig>, SettingsError> {
        let (key, endpoint) = match service {
            ExternalService::EmailValidation => (
                &self.email_validation_api_key,
                &self.email_validation_endpoint,
            ),
            ExternalService::Geolocation => (&self.geolocation_api_key, &self.geolocation_endpoint),
            ExternalService::Holidays => (&self.holidays_api_key, &self.holidays_endpoint),
        };
        let Some(key) = key.as_deref().map(str::trim).filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let raw = endpoint.as_deref().unwrap_or(service.default_endpoint());
        let url = Url::parse(raw).map_err(|err| SettingsError::Invalid {
            field: service.endpoint_field(),
            message: err.to_string(),
        })?;
        Ok(Some(AbstractApiServiceConfig::new(
            url,
            ApiKey::new(key),
            self.http_timeout(),
        )))
    }

    /// Like [`Self::service_config`] but fails when the key is absent.
    pub fn require_service_config(
        &self,
        service: ExternalService,
    ) -> Result<AbstractApiServiceConfig, SettingsError> {
        self.service_config(service)?
            .ok_or(SettingsError::Missing {
                field: service.key_field(),
            })
    }
}
