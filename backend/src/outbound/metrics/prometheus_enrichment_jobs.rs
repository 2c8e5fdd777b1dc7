//! Prometheus adapter for user enrichment job outcomes.

use async_trait::async_trait;
use prometheus::{CounterVec, Histogram, HistogramOpts, IntCounter, Opts, Registry};

use crate::domain::ports::{
    EnrichmentJobFailure, EnrichmentJobMetrics, EnrichmentJobMetricsError, EnrichmentJobSuccess,
};

const ATTEMPT_BUCKETS: &[f64] = &[1.0, 2.0, 3.0, 4.0, 5.0];

/// Prometheus-backed recorder for enrichment job outcomes.
pub struct PrometheusEnrichmentJobMetrics {
    jobs_total: CounterVec,
    failures_total: CounterVec,
    holiday_signups_total: IntCounter,
    geolocation_attempts: Histogram,
}

impl PrometheusEnrichmentJobMetrics {
    /// Create and register the collectors with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error when Prometheus rejects metric registration.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let jobs_total = CounterVec::new(
            Opts::new(
                "user_enrichment_jobs_total",
                "Total user enrichment jobs by status",
            ),
            &["status"],
        )?;
        let failures_total = CounterVec::new(
            Opts::new(
                "user_enrichment_failures_total",
                "Failed user enrichment jobs by reason",
            ),
            &["reason"],
        )?;
        let holiday_signups_total = IntCounter::new(
            "user_enrichment_holiday_signups_total",
            "Enriched users who signed up on a public holiday",
        )?;
        let geolocation_attempts = Histogram::with_opts(
            HistogramOpts::new(
                "user_enrichment_geolocation_attempts",
                "Geolocation calls made per enrichment job",
            )
            .buckets(ATTEMPT_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(jobs_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(holiday_signups_total.clone()))?;
        registry.register(Box::new(geolocation_attempts.clone()))?;
        Ok(Self {
            jobs_total,
            failures_total,
            holiday_signups_total,
            geolocation_attempts,
        })
    }

    fn observe_attempts(&self, attempts: u32) {
        if attempts > 0 {
            self.geolocation_attempts.observe(f64::from(attempts));
        }
    }
}

#[async_trait]
impl EnrichmentJobMetrics for PrometheusEnrichmentJobMetrics {
    async fn record_success(
        &self,
        payload: &EnrichmentJobSuccess,
    ) -> Result<(), EnrichmentJobMetricsError> {
        self.jobs_total.with_label_values(&["success"]).inc();
        if payload.signup_at_holiday {
            self.holiday_signups_total.inc();
        }
        self.observe_attempts(payload.attempt_count);
        Ok(())
    }

    async fn record_failure(
        &self,
        payload: &EnrichmentJobFailure,
    ) -> Result<(), EnrichmentJobMetricsError> {
        self.jobs_total.with_label_values(&["failure"]).inc();
        self.failures_total
            .with_label_values(&[payload.kind.as_label()])
            .inc();
        self.observe_attempts(payload.attempt_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for enrichment job collectors.

    use super::*;
    use crate::domain::ports::EnrichmentFailureKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn metrics() -> (Registry, PrometheusEnrichmentJobMetrics) {
        let registry = Registry::new();
        let metrics = PrometheusEnrichmentJobMetrics::new(&registry)
            .expect("metric registration should succeed");
        (registry, metrics)
    }

    #[rstest]
    fn registers_collectors_with_registry(metrics: (Registry, PrometheusEnrichmentJobMetrics)) {
        let (registry, metrics) = metrics;
        metrics.jobs_total.with_label_values(&["success"]).inc();
        metrics.failures_total.with_label_values(&["user_not_found"]).inc();
        metrics.observe_attempts(1);

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.name().to_owned())
            .collect();

        for expected in [
            "user_enrichment_jobs_total",
            "user_enrichment_failures_total",
            "user_enrichment_holiday_signups_total",
            "user_enrichment_geolocation_attempts",
        ] {
            assert!(names.iter().any(|name| name == expected), "{expected} missing");
        }
    }

    #[rstest]
    #[case(true, 1)]
    #[case(false, 0)]
    #[tokio::test]
    async fn success_counts_holiday_signups(
        metrics: (Registry, PrometheusEnrichmentJobMetrics),
        #[case] holiday: bool,
        #[case] expected: u64,
    ) {
        let (_registry, metrics) = metrics;

        metrics
            .record_success(&EnrichmentJobSuccess {
                attempt_count: 2,
                signup_at_holiday: holiday,
            })
            .await
            .expect("recording success should not fail");

        assert_eq!(
            metrics.jobs_total.with_label_values(&["success"]).get() as u64,
            1
        );
        assert_eq!(metrics.holiday_signups_total.get(), expected);
        assert_eq!(metrics.geolocation_attempts.get_sample_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failure_is_labelled_by_reason(metrics: (Registry, PrometheusEnrichmentJobMetrics)) {
        let (_registry, metrics) = metrics;

        metrics
            .record_failure(&EnrichmentJobFailure {
                attempt_count: 0,
                kind: EnrichmentFailureKind::UserNotFound,
            })
            .await
            .expect("recording failure should not fail");

        assert_eq!(
            metrics
                .failures_total
                .with_label_values(&["user_not_found"])
                .get() as u64,
            1
        );
        assert_eq!(metrics.geolocation_attempts.get_sample_count(), 0);
    }
}
