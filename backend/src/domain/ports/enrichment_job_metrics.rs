//! Domain port surface for enrichment job success/failure counters.
//!
//! The worker reports one outcome per job through this port so adapters can
//! export counters without the domain knowing about Prometheus.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording enrichment metrics.
    pub enum EnrichmentJobMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } =>
            "enrichment metrics exporter failed: {message}",
    }
}

/// Failure reason labels for enrichment jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EnrichmentFailureKind {
    /// The user referenced by the job does not exist.
    UserNotFound,
    /// The user already carries enrichment data.
    AlreadyEnriched,
    /// Retry budget was exhausted for transient source errors.
    RetryExhausted,
    /// A source returned a non-retryable failure.
    SourceRejected,
    /// A single-shot source call failed transiently.
    SourceUnavailable,
    /// A source answered with a body outside its contract.
    MalformedResponse,
    /// The user store could not be read or written.
    PersistenceFailed,
}

impl EnrichmentFailureKind {
    /// Stable snake_case label used in logs and metric labels.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::ports::EnrichmentFailureKind;
    ///
    /// assert_eq!(EnrichmentFailureKind::RetryExhausted.as_label(), "retry_exhausted");
    /// ```
    pub fn as_label(self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::AlreadyEnriched => "already_enriched",
            Self::RetryExhausted => "retry_exhausted",
            Self::SourceRejected => "source_rejected",
            Self::SourceUnavailable => "source_unavailable",
            Self::MalformedResponse => "malformed_response",
            Self::PersistenceFailed => "persistence_failed",
        }
    }
}

/// Success metric payload for one job execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentJobSuccess {
    /// Number of geolocation attempts used by this job.
    pub attempt_count: u32,
    /// Whether the signup fell on a public holiday.
    pub signup_at_holiday: bool,
}

/// Failure metric payload for one job execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentJobFailure {
    /// Number of geolocation attempts used by this job.
    pub attempt_count: u32,
    /// Domain-level failure reason label.
    pub kind: EnrichmentFailureKind,
}

/// Metrics recording port for enrichment job counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrichmentJobMetrics: Send + Sync {
    /// Record a successful enrichment job run.
    ///
    /// ```rust
    /// use social_backend::domain::ports::{
    ///     EnrichmentJobMetrics, EnrichmentJobSuccess, NoOpEnrichmentJobMetrics,
    /// };
    ///
    /// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
    /// let metrics = NoOpEnrichmentJobMetrics;
    /// let payload = EnrichmentJobSuccess {
    ///     attempt_count: 1,
    ///     signup_at_holiday: false,
    /// };
    /// assert!(metrics.record_success(&payload).await.is_ok());
    /// # });
    /// ```
    async fn record_success(
        &self,
        payload: &EnrichmentJobSuccess,
    ) -> Result<(), EnrichmentJobMetricsError>;

    /// Record a failed enrichment job run.
    async fn record_failure(
        &self,
        payload: &EnrichmentJobFailure,
    ) -> Result<(), EnrichmentJobMetricsError>;
}

/// No-op implementation used when metrics are disabled or in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEnrichmentJobMetrics;

#[async_trait]
impl EnrichmentJobMetrics for NoOpEnrichmentJobMetrics {
    async fn record_success(
        &self,
        _payload: &EnrichmentJobSuccess,
    ) -> Result<(), EnrichmentJobMetricsError> {
        Ok(())
    }

    async fn record_failure(
        &self,
        _payload: &EnrichmentJobFailure,
    ) -> Result<(), EnrichmentJobMetricsError> {
        Ok(())
    }
}
