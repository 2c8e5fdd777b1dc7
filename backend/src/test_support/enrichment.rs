//! Shared test doubles for signup and enrichment tests.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    EmailValidationSource, EnrichmentJobFailure, EnrichmentJobMetrics, EnrichmentJobMetricsError,
    EnrichmentJobSuccess, EnrichmentQueue, ExternalSourceError, GeoLocation, GeolocationSource,
    HolidaySource, JobDispatchError, UserEnrichmentJob,
};
use crate::domain::{CountryCode, EmailAddress, RetrySleeper};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> std::sync::MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex poisoned"),
    }
}

/// Clock whose current time is set by the test.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0, "clock") = now;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0, "clock") += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

/// Sleeper that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl RetrySleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        lock(&self.0, "sleeper").clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0, "sleeper").push(duration);
    }
}

fn script_exhausted<T>() -> Result<T, ExternalSourceError> {
    Err(ExternalSourceError::malformed_response(
        "test script exhausted unexpectedly",
    ))
}

/// Email validation source replaying scripted results in order.
pub struct ScriptedEmailValidationSource {
    scripted: Mutex<VecDeque<Result<bool, ExternalSourceError>>>,
    checked: Mutex<Vec<String>>,
}

impl ScriptedEmailValidationSource {
    pub fn new(scripted: Vec<Result<bool, ExternalSourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            checked: Mutex::new(Vec::new()),
        }
    }

    /// Source that always answers `verdict`.
    pub fn always(verdict: bool) -> Self {
        Self::new(vec![Ok(verdict); 64])
    }

    pub fn calls(&self) -> usize {
        lock(&self.checked, "email source").len()
    }

    pub fn checked(&self) -> Vec<String> {
        lock(&self.checked, "email source").clone()
    }
}

#[async_trait]
impl EmailValidationSource for ScriptedEmailValidationSource {
    async fn check_format(&self, email: &EmailAddress) -> Result<bool, ExternalSourceError> {
        lock(&self.checked, "email source").push(email.to_string());
        lock(&self.scripted, "email source")
            .pop_front()
            .unwrap_or_else(script_exhausted)
    }
}

/// Geolocation source replaying scripted results in order.
pub struct ScriptedGeolocationSource {
    scripted: Mutex<VecDeque<Result<GeoLocation, ExternalSourceError>>>,
    requested: Mutex<Vec<IpAddr>>,
}

impl ScriptedGeolocationSource {
    pub fn new(scripted: Vec<Result<GeoLocation, ExternalSourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Location fixture with the given attributes.
    pub fn location(
        city: Option<&str>,
        region: Option<&str>,
        country: &str,
        gmt_offset_hours: Option<i32>,
    ) -> GeoLocation {
        GeoLocation {
            city: city.map(str::to_owned),
            region: region.map(str::to_owned),
            country_code: match CountryCode::new(country) {
                Ok(code) => code,
                Err(error) => panic!("invalid fixture country {country}: {error}"),
            },
            gmt_offset_hours,
        }
    }

    pub fn calls(&self) -> usize {
        lock(&self.requested, "geolocation source").len()
    }

    pub fn requested(&self) -> Vec<IpAddr> {
        lock(&self.requested, "geolocation source").clone()
    }
}

#[async_trait]
impl GeolocationSource for ScriptedGeolocationSource {
    async fn locate(&self, ip: IpAddr) -> Result<GeoLocation, ExternalSourceError> {
        lock(&self.requested, "geolocation source").push(ip);
        lock(&self.scripted, "geolocation source")
            .pop_front()
            .unwrap_or_else(script_exhausted)
    }
}

/// Holiday source replaying scripted results in order.
pub struct ScriptedHolidaySource {
    scripted: Mutex<VecDeque<Result<bool, ExternalSourceError>>>,
    requested: Mutex<Vec<(CountryCode, NaiveDate)>>,
}

impl ScriptedHolidaySource {
    pub fn new(scripted: Vec<Result<bool, ExternalSourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        lock(&self.requested, "holiday source").len()
    }

    pub fn requested(&self) -> Vec<(CountryCode, NaiveDate)> {
        lock(&self.requested, "holiday source").clone()
    }
}

#[async_trait]
impl HolidaySource for ScriptedHolidaySource {
    async fn is_holiday(
        &self,
        country: CountryCode,
        date: NaiveDate,
    ) -> Result<bool, ExternalSourceError> {
        lock(&self.requested, "holiday source").push((country, date));
        lock(&self.scripted, "holiday source")
            .pop_front()
            .unwrap_or_else(script_exhausted)
    }
}

/// Metrics adapter capturing every payload.
#[derive(Default)]
pub struct RecordingEnrichmentMetrics {
    successes: Mutex<Vec<EnrichmentJobSuccess>>,
    failures: Mutex<Vec<EnrichmentJobFailure>>,
}

impl RecordingEnrichmentMetrics {
    pub fn successes(&self) -> Vec<EnrichmentJobSuccess> {
        lock(&self.successes, "metrics").clone()
    }

    pub fn failures(&self) -> Vec<EnrichmentJobFailure> {
        lock(&self.failures, "metrics").clone()
    }
}

#[async_trait]
impl EnrichmentJobMetrics for RecordingEnrichmentMetrics {
    async fn record_success(
        &self,
        payload: &EnrichmentJobSuccess,
    ) -> Result<(), EnrichmentJobMetricsError> {
        lock(&self.successes, "metrics").push(payload.clone());
        Ok(())
    }

    async fn record_failure(
        &self,
        payload: &EnrichmentJobFailure,
    ) -> Result<(), EnrichmentJobMetricsError> {
        lock(&self.failures, "metrics").push(payload.clone());
        Ok(())
    }
}

/// Queue capturing jobs instead of running them.
#[derive(Default)]
pub struct RecordingEnrichmentQueue {
    jobs: Mutex<Vec<UserEnrichmentJob>>,
    reject_with: Option<JobDispatchError>,
}

impl RecordingEnrichmentQueue {
    /// Queue that refuses every job with `error`.
    pub fn rejecting(error: JobDispatchError) -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            reject_with: Some(error),
        }
    }

    pub fn jobs(&self) -> Vec<UserEnrichmentJob> {
        lock(&self.jobs, "queue").clone()
    }
}

#[async_trait]
impl EnrichmentQueue for RecordingEnrichmentQueue {
    async fn enqueue(&self, job: UserEnrichmentJob) -> Result<(), JobDispatchError> {
        if let Some(error) = &self.reject_with {
            return Err(error.clone());
        }
        lock(&self.jobs, "queue").push(job);
        Ok(())
    }
}
