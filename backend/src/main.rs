//! Backend entry-point: loads settings, wires adapters, and serves the API.

mod server;

use std::time::Duration;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use social_backend::inbound::http::health::HealthState;
use social_backend::settings::AppSettings;

use server::{ServerConfig, build_application, create_server};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    info!(?settings, "configuration loaded");
    let bind_addr = settings.bind_addr()?;

    let application = build_application(&settings).await?;

    #[cfg(not(feature = "metrics"))]
    let config = ServerConfig::new(bind_addr);
    #[cfg(feature = "metrics")]
    let config = ServerConfig::new(bind_addr, application.prometheus.clone());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), application.http_state, config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    // Dropping the HTTP state closes the queue; the consumer drains and exits.
    match tokio::time::timeout(SHUTDOWN_GRACE, application.consumer).await {
        Ok(Ok(())) => info!("enrichment consumer drained"),
        Ok(Err(join_error)) => warn!(error = %join_error, "enrichment consumer ended abnormally"),
        Err(_) => warn!("enrichment consumer still busy at shutdown; pending jobs dropped"),
    }
    result.wrap_err("server terminated")
}
