//! Builders wiring settings into adapters, domain services, and HTTP state.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use social_backend::domain::ports::{
    EmailValidationSource, EnrichmentJobMetrics, FixtureEmailValidationSource, UserRepository,
};
use social_backend::domain::{
    EmailValidationService, TokioSleeper, UserEnrichmentWorker, UserEnrichmentWorkerPorts,
    UserQueryService, UserSignupService,
};
use social_backend::inbound::http::state::HttpState;
use social_backend::outbound::abstract_api::{
    HttpEmailValidationSource, HttpGeolocationSource, HttpHolidaySource,
};
use social_backend::outbound::persistence::{
    DbPool, DieselUserRepository, InMemoryUserRepository, PoolConfig, run_migrations,
};
use social_backend::outbound::queue::{InProcessEnrichmentQueue, spawn_enrichment_consumer};
use social_backend::settings::{AppSettings, ExternalService};

#[cfg(feature = "metrics")]
use social_backend::outbound::metrics::PrometheusEnrichmentJobMetrics;

/// Everything the binary needs once wiring succeeds.
pub struct Application {
    pub http_state: web::Data<HttpState>,
    pub consumer: JoinHandle<()>,
    #[cfg(feature = "metrics")]
    pub prometheus: actix_web_prom::PrometheusMetrics,
}

async fn build_user_repository(settings: &AppSettings) -> Result<Arc<dyn UserRepository>> {
    match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url)
                .await
                .wrap_err("failed to apply database migrations")?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .wrap_err("failed to build database pool")?;
            info!("using PostgreSQL user store");
            Ok(Arc::new(DieselUserRepository::new(pool)))
        }
        None => {
            warn!("no database URL configured; users are kept in memory");
            Ok(Arc::new(InMemoryUserRepository::default()))
        }
    }
}

fn build_email_source(settings: &AppSettings) -> Result<Arc<dyn EmailValidationSource>> {
    match settings.service_config(ExternalService::EmailValidation)? {
        Some(config) => Ok(Arc::new(
            HttpEmailValidationSource::new(config)
                .wrap_err("failed to build email validation client")?,
        )),
        None if cfg!(debug_assertions) => {
            warn!("no email validation key configured; accepting every address (dev only)");
            Ok(Arc::new(FixtureEmailValidationSource))
        }
        None => Err(social_backend::settings::SettingsError::Missing {
            field: "email_validation_api_key",
        }
        .into()),
    }
}

#[cfg(feature = "metrics")]
fn build_metrics() -> Result<(Arc<dyn EnrichmentJobMetrics>, actix_web_prom::PrometheusMetrics)> {
    let registry = prometheus::Registry::new();
    let jobs = PrometheusEnrichmentJobMetrics::new(&registry)
        .wrap_err("enrichment metrics registration failed")?;
    let middleware = actix_web_prom::PrometheusMetricsBuilder::new("social")
        .registry(registry)
        .endpoint("/metrics")
        .build()
        .map_err(|err| eyre!("configure Prometheus metrics: {err}"))?;
    Ok((Arc::new(jobs), middleware))
}

/// Build adapters and services from `settings` and start the enrichment
/// consumer.
///
/// # Errors
/// Fails when a required API key is missing, a value cannot be parsed, or
/// the database cannot be prepared.
pub async fn build_application(settings: &AppSettings) -> Result<Application> {
    let users = build_user_repository(settings).await?;
    let policy = settings.retry_policy();
    let sleeper = Arc::new(TokioSleeper);

    let geolocation = HttpGeolocationSource::new(
        settings.require_service_config(ExternalService::Geolocation)?,
    )
    .wrap_err("failed to build geolocation client")?;
    let holidays = HttpHolidaySource::new(
        settings.require_service_config(ExternalService::Holidays)?,
    )
    .wrap_err("failed to build holiday client")?;

    #[cfg(feature = "metrics")]
    let (metrics, prometheus) = build_metrics()?;
    #[cfg(not(feature = "metrics"))]
    let metrics: Arc<dyn EnrichmentJobMetrics> =
        Arc::new(social_backend::domain::ports::NoOpEnrichmentJobMetrics);

    let worker = UserEnrichmentWorker::with_sleeper(
        UserEnrichmentWorkerPorts::new(
            users.clone(),
            Arc::new(geolocation),
            Arc::new(holidays),
            metrics,
        ),
        Arc::new(DefaultClock),
        sleeper.clone(),
        policy,
    );
    let (queue, receiver) = InProcessEnrichmentQueue::bounded(settings.queue_capacity());
    let consumer = spawn_enrichment_consumer(receiver, Arc::new(worker));

    let validation = EmailValidationService::new(build_email_source(settings)?, sleeper, policy);
    let signup_service = UserSignupService::new(users.clone(), validation, Arc::new(queue));
    let query = UserQueryService::new(users);

    Ok(Application {
        http_state: web::Data::new(HttpState::new(Arc::new(signup_service), Arc::new(query))),
        consumer,
        #[cfg(feature = "metrics")]
        prometheus,
    })
}
