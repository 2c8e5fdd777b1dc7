//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **abstract_api**: HTTP clients for the hosted email validation, IP
//!   geolocation, and public holiday services
//! - **persistence**: user record stores (PostgreSQL via Diesel, in-memory)
//! - **queue**: in-process enrichment job queue and its consumer
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod abstract_api;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod queue;
