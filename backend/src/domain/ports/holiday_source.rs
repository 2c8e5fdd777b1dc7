//! Driven port for public holiday lookups.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::CountryCode;

use super::ExternalSourceError;

/// Port for checking whether a calendar date is a public holiday.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolidaySource: Send + Sync {
    /// Return whether `date` is a public holiday in `country`.
    async fn is_holiday(
        &self,
        country: CountryCode,
        date: NaiveDate,
    ) -> Result<bool, ExternalSourceError>;
}
