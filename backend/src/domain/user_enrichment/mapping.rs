//! Mapping helpers from step failures to enrichment failure kinds.

use crate::domain::ports::{EnrichmentFailureKind, ExternalSourceError};
use crate::domain::retry::RetryFailure;

pub(super) fn map_geolocation_failure(failure: &RetryFailure) -> EnrichmentFailureKind {
    match failure {
        RetryFailure::Exhausted { .. } => EnrichmentFailureKind::RetryExhausted,
        RetryFailure::Rejected { error, .. } => map_source_error(error),
    }
}

pub(super) fn map_holiday_failure(error: &ExternalSourceError) -> EnrichmentFailureKind {
    if error.is_transient() {
        EnrichmentFailureKind::SourceUnavailable
    } else {
        map_source_error(error)
    }
}

fn map_source_error(error: &ExternalSourceError) -> EnrichmentFailureKind {
    match error {
        ExternalSourceError::MalformedResponse { .. } => EnrichmentFailureKind::MalformedResponse,
        _ => EnrichmentFailureKind::SourceRejected,
    }
}
