//! Email format validation with retries.
//!
//! Signup blocks on this check. Transient failures of the hosted service are
//! retried under [`FixedRetryPolicy`]; any failure that survives the policy
//! is treated as "not valid" so a broken dependency never lets an unchecked
//! address through and never surfaces as an error.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::EmailAddress;
use crate::domain::ports::{EmailValidationSource, ExternalSourceError};
use crate::domain::retry::{FixedRetryPolicy, RetryFailure, RetrySleeper};

/// Domain service answering "is this email well formed?".
#[derive(Clone)]
pub struct EmailValidationService {
    source: Arc<dyn EmailValidationSource>,
    sleeper: Arc<dyn RetrySleeper>,
    policy: FixedRetryPolicy,
}

impl EmailValidationService {
    /// Build the service around a source, sleeper, and retry policy.
    pub fn new(
        source: Arc<dyn EmailValidationSource>,
        sleeper: Arc<dyn RetrySleeper>,
        policy: FixedRetryPolicy,
    ) -> Self {
        Self {
            source,
            sleeper,
            policy,
        }
    }

    /// Return whether `email` has a valid format.
    ///
    /// Never fails: exhausted retries, client errors, and malformed responses
    /// all yield `false`.
    pub async fn is_valid_email(&self, email: &EmailAddress) -> bool {
        let outcome = self
            .policy
            .run(self.sleeper.as_ref(), |_attempt| {
                self.source.check_format(email)
            })
            .await;

        match outcome {
            Ok(attempted) => attempted.value,
            Err(RetryFailure::Exhausted {
                attempts,
                last_error,
            }) => {
                warn!(
                    attempts,
                    error = %last_error,
                    "email validation unavailable; treating address as invalid"
                );
                false
            }
            Err(RetryFailure::Rejected { error: rejected, .. }) => {
                log_rejection(&rejected);
                false
            }
        }
    }
}

fn log_rejection(rejected: &ExternalSourceError) {
    match rejected {
        ExternalSourceError::ClientError { status, .. } => {
            error!(status, error = %rejected, "email validation request rejected");
        }
        _ => error!(error = %rejected, "email validation failed"),
    }
}
