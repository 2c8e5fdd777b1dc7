//! In-process enrichment queue backed by a bounded tokio channel.
//!
//! Signup pushes [`UserEnrichmentJob`]s with `try_send`, so a full queue is
//! reported immediately instead of stalling the request. A single consumer
//! task drains the channel, running each job under the trace identifier
//! captured at signup.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::domain::ports::{EnrichmentQueue, JobDispatchError, UserEnrichmentJob};
use crate::domain::{TraceId, UserEnrichmentWorker};

/// Default number of jobs buffered between signup and the consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Producer half of the enrichment channel.
#[derive(Debug, Clone)]
pub struct InProcessEnrichmentQueue {
    sender: mpsc::Sender<UserEnrichmentJob>,
}

impl InProcessEnrichmentQueue {
    /// Create a queue holding at most `capacity` pending jobs.
    ///
    /// Returns the producer and the receiver to hand to
    /// [`spawn_enrichment_consumer`].
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<UserEnrichmentJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EnrichmentQueue for InProcessEnrichmentQueue {
    async fn enqueue(&self, job: UserEnrichmentJob) -> Result<(), JobDispatchError> {
        self.sender.try_send(job).map_err(|err| match err {
            mpsc::error::TrySendError::Full(job) => {
                JobDispatchError::full(format!("dropping job for user {}", job.user_id))
            }
            mpsc::error::TrySendError::Closed(job) => {
                JobDispatchError::closed(format!("dropping job for user {}", job.user_id))
            }
        })
    }
}

/// Spawn the task that drains `receiver` into `worker`.
///
/// Jobs run one at a time, each on its own task so a panicking job is logged
/// without stopping the consumer. The task ends once every producer is
/// dropped and the backlog is drained.
pub fn spawn_enrichment_consumer(
    mut receiver: mpsc::Receiver<UserEnrichmentJob>,
    worker: Arc<UserEnrichmentWorker>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            let worker = Arc::clone(&worker);
            let trace_id = job.trace_id.unwrap_or_else(TraceId::generate);
            debug!(user_id = %job.user_id, %trace_id, "dispatching enrichment job");
            let run = tokio::spawn(TraceId::scope(trace_id, async move {
                worker.enrich(job).await;
            }));
            if let Err(join_error) = run.await {
                error!(
                    user_id = %job.user_id,
                    error = %join_error,
                    "enrichment job task failed"
                );
            }
        }
        debug!("enrichment consumer stopped");
    })
}
