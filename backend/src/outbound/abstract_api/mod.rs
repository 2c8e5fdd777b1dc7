//! Reqwest adapters for the hosted email, geolocation, and holiday APIs.
//!
//! All three services share one request shape: `GET <endpoint>?api_key=...`
//! plus service-specific query parameters, answering with JSON. The shared
//! transport and error mapping live in [`client`]; each adapter only builds
//! its query and decodes its body.

mod client;
mod dto;
mod email_validation;
mod geolocation;
mod holidays;

pub use client::{AbstractApiServiceConfig, ApiKey};
pub use email_validation::{DEFAULT_EMAIL_VALIDATION_ENDPOINT, HttpEmailValidationSource};
pub use geolocation::{DEFAULT_GEOLOCATION_ENDPOINT, HttpGeolocationSource};
pub use holidays::{DEFAULT_HOLIDAYS_ENDPOINT, HttpHolidaySource};
