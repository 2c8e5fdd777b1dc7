//! Social network backend: signup, background enrichment, and user lookups.
//!
//! Layout follows a hexagonal split:
//! - [`domain`]: entities, services, and the ports they depend on;
//! - [`outbound`]: adapters for hosted APIs, storage, queueing, and metrics;
//! - [`inbound`]: the actix-web HTTP surface;
//! - [`middleware`]: request tracing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
