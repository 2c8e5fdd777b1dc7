//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UserSignup, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub signup: Arc<dyn UserSignup>,
    pub users: Arc<dyn UsersQuery>,
}

impl HttpState {
    /// Construct state from the driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use social_backend::domain::{UserQueryService, UserSignupService};
    /// use social_backend::inbound::http::state::HttpState;
    ///
    /// fn build(signup: UserSignupService, users: UserQueryService) -> HttpState {
    ///     HttpState::new(Arc::new(signup), Arc::new(users))
    /// }
    /// ```
    pub fn new(signup: Arc<dyn UserSignup>, users: Arc<dyn UsersQuery>) -> Self {
        Self { signup, users }
    }
}
