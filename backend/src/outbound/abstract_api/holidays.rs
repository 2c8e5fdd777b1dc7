//! Public holiday adapter.
//!
//! The service answers with a list of holidays for the requested day. Only
//! the truthiness of the decoded body matters: an empty list means "not a
//! holiday".

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use super::client::{AbstractApiClient, AbstractApiServiceConfig};
use super::dto::is_truthy;
use crate::domain::CountryCode;
use crate::domain::ports::{ExternalSourceError, HolidaySource};

/// Default endpoint of the holiday lookup service.
pub const DEFAULT_HOLIDAYS_ENDPOINT: &str = "https://holidays.abstractapi.com/v1/";

/// Holiday source backed by the hosted HTTP API.
pub struct HttpHolidaySource {
    client: AbstractApiClient,
}

impl HttpHolidaySource {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: AbstractApiServiceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: AbstractApiClient::new(config, "holidays")?,
        })
    }
}

#[async_trait]
impl HolidaySource for HttpHolidaySource {
    async fn is_holiday(
        &self,
        country: CountryCode,
        date: NaiveDate,
    ) -> Result<bool, ExternalSourceError> {
        let body = self.client.get(&query_for(country, date)).await?;
        parse_holiday(&body)
    }
}

fn query_for(country: CountryCode, date: NaiveDate) -> [(&'static str, String); 4] {
    [
        ("country", country.to_string()),
        ("year", date.year().to_string()),
        ("month", date.month().to_string()),
        ("day", date.day().to_string()),
    ]
}

fn parse_holiday(body: &[u8]) -> Result<bool, ExternalSourceError> {
    let decoded: Value = serde_json::from_slice(body).map_err(|error| {
        ExternalSourceError::malformed_response(format!("invalid holiday payload: {error}"))
    })?;
    Ok(is_truthy(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_unpadded_date_parts() {
        let country = CountryCode::new("il").expect("country");
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).expect("date");
        assert_eq!(
            query_for(country, date),
            [
                ("country", "IL".to_owned()),
                ("year", "2024".to_owned()),
                ("month", "5".to_owned()),
                ("day", "4".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_list_is_not_a_holiday() {
        assert_eq!(parse_holiday(b"[]"), Ok(false));
    }

    #[test]
    fn holiday_list_is_a_holiday() {
        let body = br#"[{"name":"Independence Day","country":"IL","date":"05/14/2024"}]"#;
        assert_eq!(parse_holiday(body), Ok(true));
    }

    #[test]
    fn undecodable_body_is_malformed() {
        assert!(matches!(
            parse_holiday(b"<html>"),
            Err(ExternalSourceError::MalformedResponse { .. })
        ));
    }
}
