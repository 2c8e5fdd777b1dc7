//! Driving port for the signup use-case.
//!
//! Inbound adapters call this port to register a user without knowing which
//! validation service, store, or queue back it.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Raw signup input as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    /// Requested login name.
    pub username: String,
    /// Email address to validate.
    pub email: String,
    /// Address the request originated from.
    pub ip: IpAddr,
}

/// Domain use-case port for creating users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserSignup: Send + Sync {
    /// Validate the request, store the user, and schedule enrichment.
    async fn signup(&self, request: SignupRequest) -> Result<User, Error>;
}
