//! HTTP server configuration object.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Construct a server configuration bound to `bind_addr`.
    #[cfg(not(feature = "metrics"))]
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }

    /// Construct a server configuration with the Prometheus middleware.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn new(bind_addr: SocketAddr, prometheus: PrometheusMetrics) -> Self {
        Self {
            bind_addr,
            prometheus,
        }
    }
}
