//! Driven port for IP geolocation lookups.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::domain::CountryCode;

use super::ExternalSourceError;

/// Location attributes resolved for one IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    /// City name, when the service knows it.
    pub city: Option<String>,
    /// Region or state name, when the service knows it.
    pub region: Option<String>,
    /// Country the address is located in.
    pub country_code: CountryCode,
    /// Whole-hour offset from GMT reported for the address timezone.
    pub gmt_offset_hours: Option<i32>,
}

/// Port for resolving an IP address to a location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    /// Look up `ip`. One call, no retries.
    async fn locate(&self, ip: IpAddr) -> Result<GeoLocation, ExternalSourceError>;
}
