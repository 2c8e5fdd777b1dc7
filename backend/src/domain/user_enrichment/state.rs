//! Enrichment run state machine and its report.

use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::EnrichmentFailureKind;

/// Lifecycle of one enrichment run.
///
/// ```text
/// Created -> GeoPending -> GeoDone -> HolidayPending -> Enriched
///    |           |                          |
///    +-----------+--------------------------+--> Failed(kind)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentState {
    /// Job accepted; user not yet loaded.
    Created,
    /// Geolocation lookup in flight (including retries).
    GeoPending,
    /// Location and GMT offset resolved.
    GeoDone,
    /// Holiday lookup in flight.
    HolidayPending,
    /// Enrichment persisted.
    Enriched,
    /// Run aborted; the user record is unchanged.
    Failed(EnrichmentFailureKind),
}

impl EnrichmentState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Enriched | Self::Failed(_))
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Created, Self::GeoPending)
            | (Self::GeoPending, Self::GeoDone)
            | (Self::GeoDone, Self::HolidayPending)
            | (Self::HolidayPending, Self::Enriched) => true,
            (Self::Created | Self::GeoPending | Self::HolidayPending, Self::Failed(_)) => true,
            _ => false,
        }
    }
}

/// Summary of one enrichment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
    /// User the run targeted.
    pub user_id: UserId,
    /// Every state visited, starting with [`EnrichmentState::Created`].
    pub transitions: Vec<EnrichmentState>,
    /// Geolocation calls made, including retries.
    pub geolocation_attempts: u32,
}

impl EnrichmentReport {
    /// Terminal state of the run.
    pub fn state(&self) -> EnrichmentState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(EnrichmentState::Created)
    }

    /// Failure reason, when the run failed.
    pub fn failure(&self) -> Option<EnrichmentFailureKind> {
        match self.state() {
            EnrichmentState::Failed(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Mutable record of a run in progress.
pub(super) struct RunTracker {
    report: EnrichmentReport,
}

impl RunTracker {
    pub(super) fn new(user_id: UserId) -> Self {
        Self {
            report: EnrichmentReport {
                user_id,
                transitions: vec![EnrichmentState::Created],
                geolocation_attempts: 0,
            },
        }
    }

    pub(super) fn current(&self) -> EnrichmentState {
        self.report.state()
    }

    /// Move to `next`. Illegal transitions are ignored and logged.
    pub(super) fn advance(&mut self, next: EnrichmentState) {
        let current = self.current();
        if !current.can_advance_to(next) {
            debug!(from = ?current, to = ?next, "ignoring illegal enrichment transition");
            return;
        }
        debug!(user_id = %self.report.user_id, from = ?current, to = ?next, "enrichment transition");
        self.report.transitions.push(next);
    }

    pub(super) fn fail(&mut self, kind: EnrichmentFailureKind) {
        self.advance(EnrichmentState::Failed(kind));
    }

    pub(super) fn set_geolocation_attempts(&mut self, attempts: u32) {
        self.report.geolocation_attempts = attempts;
    }

    pub(super) fn into_report(self) -> EnrichmentReport {
        self.report
    }
}
