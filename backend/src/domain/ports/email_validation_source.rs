//! Driven port for the third-party email validation service.

use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::ExternalSourceError;

/// Port for checking whether an email address is well formed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailValidationSource: Send + Sync {
    /// Ask the service whether `email` has a valid format.
    ///
    /// One call, no retries; retry policy belongs to the caller.
    async fn check_format(&self, email: &EmailAddress) -> Result<bool, ExternalSourceError>;
}

/// Fixture source that accepts every address.
///
/// Used when no API key is configured so local runs do not depend on the
/// hosted service.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureEmailValidationSource;

#[async_trait]
impl EmailValidationSource for FixtureEmailValidationSource {
    async fn check_format(&self, _email: &EmailAddress) -> Result<bool, ExternalSourceError> {
        Ok(true)
    }
}
