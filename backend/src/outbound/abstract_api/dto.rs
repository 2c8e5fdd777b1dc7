//! DTOs for decoding the hosted API responses.
//!
//! Adapters decode into these transport shapes first, then map into domain
//! values in one pass. Only the fields the domain reads are modelled.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::CountryCode;
use crate::domain::ports::GeoLocation;

#[derive(Debug, Deserialize)]
pub(super) struct EmailValidationDto {
    pub(super) is_valid_format: FlagDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct FlagDto {
    pub(super) value: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeolocationDto {
    #[serde(default)]
    pub(super) city: Option<String>,
    #[serde(default)]
    pub(super) region: Option<String>,
    #[serde(default)]
    pub(super) country_code: Option<String>,
    #[serde(default)]
    pub(super) timezone: Option<TimezoneDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TimezoneDto {
    #[serde(default)]
    pub(super) gmt_offset: Option<i32>,
}

impl GeolocationDto {
    pub(super) fn into_domain(self) -> Result<GeoLocation, String> {
        let raw_code = self
            .country_code
            .ok_or_else(|| "country_code missing".to_owned())?;
        let country_code = CountryCode::new(&raw_code)
            .map_err(|error| format!("country_code {raw_code:?}: {error}"))?;
        Ok(GeoLocation {
            city: self.city,
            region: self.region,
            country_code,
            gmt_offset_hours: self.timezone.and_then(|tz| tz.gmt_offset),
        })
    }
}

/// Truthiness of a decoded holiday response body.
///
/// `null`, `false`, zero, the empty string, the empty array, and the empty
/// object are falsy; everything else is truthy.
pub(super) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
