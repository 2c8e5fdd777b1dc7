//! Domain port describing dispatch of background enrichment jobs.
use async_trait::async_trait;

use crate::domain::{TraceId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the queue adapter.
    pub enum JobDispatchError {
        /// The queue is at capacity.
        Full { message: String } => "enrichment queue is full: {message}",
        /// The consumer is gone and no further jobs can be accepted.
        Closed { message: String } => "enrichment queue is closed: {message}",
    }
}

/// One request to enrich a freshly created user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEnrichmentJob {
    /// User to enrich.
    pub user_id: UserId,
    /// Trace identifier of the signup request that created the user.
    pub trace_id: Option<TraceId>,
}

impl UserEnrichmentJob {
    /// Build a job for `user_id`, capturing the trace identifier in scope.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            trace_id: TraceId::current(),
        }
    }
}

/// Queue accepting enrichment jobs for asynchronous processing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrichmentQueue: Send + Sync {
    /// Hand `job` to the background consumer without waiting for it to run.
    async fn enqueue(&self, job: UserEnrichmentJob) -> Result<(), JobDispatchError>;
}
