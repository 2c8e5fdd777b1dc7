//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod email_validation_source;
mod enrichment_job_metrics;
mod enrichment_queue;
mod external_source_error;
mod geolocation_source;
mod holiday_source;
mod user_repository;
mod user_signup;
mod users_query;

#[cfg(test)]
pub use email_validation_source::MockEmailValidationSource;
pub use email_validation_source::{EmailValidationSource, FixtureEmailValidationSource};
#[cfg(test)]
pub use enrichment_job_metrics::MockEnrichmentJobMetrics;
pub use enrichment_job_metrics::{
    EnrichmentFailureKind, EnrichmentJobFailure, EnrichmentJobMetrics, EnrichmentJobMetricsError,
    EnrichmentJobSuccess, NoOpEnrichmentJobMetrics,
};
#[cfg(test)]
pub use enrichment_queue::MockEnrichmentQueue;
pub use enrichment_queue::{EnrichmentQueue, JobDispatchError, UserEnrichmentJob};
pub use external_source_error::ExternalSourceError;
#[cfg(test)]
pub use geolocation_source::MockGeolocationSource;
pub use geolocation_source::{GeoLocation, GeolocationSource};
#[cfg(test)]
pub use holiday_source::MockHolidaySource;
pub use holiday_source::HolidaySource;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_signup::MockUserSignup;
pub use user_signup::{SignupRequest, UserSignup};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
