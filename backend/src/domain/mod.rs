//! Domain primitives, ports, and services.
//!
//! Purpose: own the signup and enrichment rules independent of HTTP, storage,
//! and the hosted lookup APIs. Adapters plug in through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic error payload.
//! - User and its value types — the user record and enrichment attributes.
//! - EmailValidationService — retrying, fail-safe email format check.
//! - UserSignupService / UserQueryService — driving-port implementations.
//! - UserEnrichmentWorker — background geolocation and holiday enrichment.
//! - FixedRetryPolicy / RetrySleeper — shared retry budget.

pub mod email_validation;
pub mod error;
pub mod ports;
pub mod retry;
pub mod trace_id;
pub mod user;
pub mod user_enrichment;
pub mod user_signup;

pub use self::email_validation::EmailValidationService;
pub use self::error::{Error, ErrorCode};
pub use self::retry::{Attempted, FixedRetryPolicy, RetryFailure, RetrySleeper, TokioSleeper};
pub use self::trace_id::TraceId;
pub use self::user::{
    CountryCode, EmailAddress, EnrichmentError, User, UserEnrichment, UserId,
    UserValidationError, Username,
};
pub use self::user_enrichment::{
    EnrichmentReport, EnrichmentState, UserEnrichmentWorker, UserEnrichmentWorkerPorts,
};
pub use self::user_signup::{INVALID_EMAIL_MESSAGE, UserQueryService, UserSignupService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use social_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
