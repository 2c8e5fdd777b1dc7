//! Driving port for reading user records.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for user lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return the user with `id`, or a not-found error.
    async fn find_user(&self, id: &UserId) -> Result<User, Error>;
}
