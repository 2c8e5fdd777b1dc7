//! Offset and local calendar date helpers for the holiday step.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Lowest GMT offset in use, in hours.
pub const MIN_GMT_OFFSET_HOURS: i32 = -12;
/// Highest GMT offset in use, in hours.
pub const MAX_GMT_OFFSET_HOURS: i32 = 14;

/// Reason a reported offset cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OffsetError {
    Missing,
    OutOfRange(i32),
}

/// Resolve the GMT offset used to compute the user's local date.
///
/// Loopback addresses always use offset zero; the service has no meaningful
/// timezone for them. IPv4-mapped IPv6 addresses from dual-stack listeners
/// are checked in their IPv4 form.
pub(super) fn effective_offset(ip: IpAddr, reported: Option<i32>) -> Result<i32, OffsetError> {
    if ip.to_canonical().is_loopback() {
        return Ok(0);
    }
    match reported {
        None => Err(OffsetError::Missing),
        Some(hours) if (MIN_GMT_OFFSET_HOURS..=MAX_GMT_OFFSET_HOURS).contains(&hours) => Ok(hours),
        Some(hours) => Err(OffsetError::OutOfRange(hours)),
    }
}

/// Calendar date at `now` shifted by `offset_hours`.
pub(super) fn local_date(now: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    (now + TimeDelta::hours(i64::from(offset_hours))).date_naive()
}
