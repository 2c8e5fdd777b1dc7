//! Background enrichment of newly created users.
//!
//! One run resolves the signup IP to a location (retrying transient failures),
//! derives the user's local calendar date from the reported GMT offset, asks
//! whether that date is a public holiday in the resolved country, and writes
//! all four attributes in a single save. Any failure leaves the stored user
//! untouched; nothing escapes the run except its [`EnrichmentReport`].

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    EnrichmentFailureKind, EnrichmentJobFailure, EnrichmentJobMetrics, EnrichmentJobSuccess,
    GeoLocation, GeolocationSource, HolidaySource, UserEnrichmentJob, UserRepository,
};
use crate::domain::retry::{FixedRetryPolicy, RetrySleeper, TokioSleeper};
use crate::domain::{User, UserEnrichment};

mod local_date;
mod mapping;
mod state;

pub use local_date::{MAX_GMT_OFFSET_HOURS, MIN_GMT_OFFSET_HOURS};
pub use state::{EnrichmentReport, EnrichmentState};

use local_date::OffsetError;
use state::RunTracker;

/// Port bundle required by the enrichment worker.
pub struct UserEnrichmentWorkerPorts {
    /// User store read at the start and written at the end of a run.
    pub users: Arc<dyn UserRepository>,
    /// IP geolocation adapter.
    pub geolocation: Arc<dyn GeolocationSource>,
    /// Public holiday adapter.
    pub holidays: Arc<dyn HolidaySource>,
    /// Enrichment metrics adapter.
    pub metrics: Arc<dyn EnrichmentJobMetrics>,
}

impl UserEnrichmentWorkerPorts {
    /// Build a strongly-typed worker port bundle.
    pub fn new(
        users: Arc<dyn UserRepository>,
        geolocation: Arc<dyn GeolocationSource>,
        holidays: Arc<dyn HolidaySource>,
        metrics: Arc<dyn EnrichmentJobMetrics>,
    ) -> Self {
        Self {
            users,
            geolocation,
            holidays,
            metrics,
        }
    }
}

/// Domain-owned user enrichment worker.
pub struct UserEnrichmentWorker {
    users: Arc<dyn UserRepository>,
    geolocation: Arc<dyn GeolocationSource>,
    holidays: Arc<dyn HolidaySource>,
    metrics: Arc<dyn EnrichmentJobMetrics>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn RetrySleeper>,
    policy: FixedRetryPolicy,
}

impl UserEnrichmentWorker {
    /// Build a worker that sleeps on the tokio timer between retries.
    pub fn new(
        ports: UserEnrichmentWorkerPorts,
        clock: Arc<dyn Clock>,
        policy: FixedRetryPolicy,
    ) -> Self {
        Self::with_sleeper(ports, clock, Arc::new(TokioSleeper), policy)
    }

    /// Build a worker with an injected sleeper.
    pub fn with_sleeper(
        ports: UserEnrichmentWorkerPorts,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn RetrySleeper>,
        policy: FixedRetryPolicy,
    ) -> Self {
        Self {
            users: ports.users,
            geolocation: ports.geolocation,
            holidays: ports.holidays,
            metrics: ports.metrics,
            clock,
            sleeper,
            policy,
        }
    }

    /// Execute one enrichment job to a terminal state.
    ///
    /// Never fails; the outcome is carried by the returned report.
    pub async fn enrich(&self, job: UserEnrichmentJob) -> EnrichmentReport {
        let mut tracker = RunTracker::new(job.user_id);
        info!(user_id = %job.user_id, "starting user enrichment");

        match self.run(&job, &mut tracker).await {
            Ok(enrichment) => {
                tracker.advance(EnrichmentState::Enriched);
                let report = tracker.into_report();
                info!(
                    user_id = %job.user_id,
                    country = %enrichment.country,
                    signup_at_holiday = enrichment.signup_at_holiday,
                    attempts = report.geolocation_attempts,
                    "user enriched"
                );
                self.record_success_metric(EnrichmentJobSuccess {
                    attempt_count: report.geolocation_attempts,
                    signup_at_holiday: enrichment.signup_at_holiday,
                })
                .await;
                report
            }
            Err(kind) => {
                tracker.fail(kind);
                let report = tracker.into_report();
                warn!(
                    user_id = %job.user_id,
                    reason = kind.as_label(),
                    attempts = report.geolocation_attempts,
                    "user enrichment failed; record left unenriched"
                );
                self.record_failure_metric(kind, report.geolocation_attempts)
                    .await;
                report
            }
        }
    }

    async fn run(
        &self,
        job: &UserEnrichmentJob,
        tracker: &mut RunTracker,
    ) -> Result<UserEnrichment, EnrichmentFailureKind> {
        let mut user = self.load_user(job).await?;

        tracker.advance(EnrichmentState::GeoPending);
        let location = self.locate(&user, tracker).await?;
        let offset = local_date::effective_offset(user.ip(), location.gmt_offset_hours).map_err(
            |error| {
                match error {
                    OffsetError::Missing => warn!("geolocation response has no GMT offset"),
                    OffsetError::OutOfRange(hours) => {
                        warn!(hours, "geolocation GMT offset out of range");
                    }
                }
                EnrichmentFailureKind::MalformedResponse
            },
        )?;
        tracker.advance(EnrichmentState::GeoDone);

        let date = local_date::local_date(self.clock.utc(), offset);
        tracker.advance(EnrichmentState::HolidayPending);
        let signup_at_holiday = self
            .holidays
            .is_holiday(location.country_code, date)
            .await
            .map_err(|error| {
                warn!(%error, country = %location.country_code, %date, "holiday lookup failed");
                mapping::map_holiday_failure(&error)
            })?;

        let enrichment = UserEnrichment {
            city: location.city,
            region: location.region,
            country: location.country_code,
            signup_at_holiday,
        };
        user.enrich(enrichment.clone())
            .map_err(|_| EnrichmentFailureKind::AlreadyEnriched)?;
        self.users.upsert(&user).await.map_err(|error| {
            warn!(%error, "failed to persist user enrichment");
            EnrichmentFailureKind::PersistenceFailed
        })?;
        Ok(enrichment)
    }

    async fn load_user(&self, job: &UserEnrichmentJob) -> Result<User, EnrichmentFailureKind> {
        let user = self
            .users
            .find_by_id(&job.user_id)
            .await
            .map_err(|error| {
                warn!(%error, "failed to load user for enrichment");
                EnrichmentFailureKind::PersistenceFailed
            })?
            .ok_or(EnrichmentFailureKind::UserNotFound)?;
        if user.enrichment().is_some() {
            return Err(EnrichmentFailureKind::AlreadyEnriched);
        }
        Ok(user)
    }

    async fn locate(
        &self,
        user: &User,
        tracker: &mut RunTracker,
    ) -> Result<GeoLocation, EnrichmentFailureKind> {
        let ip = user.ip();
        let outcome = self
            .policy
            .run(self.sleeper.as_ref(), |_attempt| self.geolocation.locate(ip))
            .await;
        match outcome {
            Ok(attempted) => {
                tracker.set_geolocation_attempts(attempted.attempts);
                Ok(attempted.value)
            }
            Err(failure) => {
                tracker.set_geolocation_attempts(failure.attempts());
                warn!(%ip, attempts = failure.attempts(), "geolocation lookup failed");
                Err(mapping::map_geolocation_failure(&failure))
            }
        }
    }

    async fn record_success_metric(&self, payload: EnrichmentJobSuccess) {
        // Exporter errors never fail a job.
        let _ = self.metrics.record_success(&payload).await;
    }

    async fn record_failure_metric(&self, kind: EnrichmentFailureKind, attempts: u32) {
        let payload = EnrichmentJobFailure {
            attempt_count: attempts,
            kind,
        };
        let _ = self.metrics.record_failure(&payload).await;
    }
}

#[cfg(test)]
mod tests;
