//! Unit tests for user enrichment orchestration.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::{EnrichmentState, UserEnrichmentWorker, UserEnrichmentWorkerPorts};
use crate::domain::ports::{
    EnrichmentFailureKind, EnrichmentJobMetricsError, ExternalSourceError, GeoLocation,
    MockEnrichmentJobMetrics, MockUserRepository, UserEnrichmentJob, UserPersistenceError,
    UserRepository,
};
use crate::domain::retry::FixedRetryPolicy;
use crate::domain::{CountryCode, EmailAddress, User, UserEnrichment, UserId, Username};
use crate::outbound::persistence::InMemoryUserRepository;
use crate::test_support::{
    MutableClock, RecordingEnrichmentMetrics, RecordingSleeper, ScriptedGeolocationSource,
    ScriptedHolidaySource,
};

const TEL_AVIV_IP: Ipv4Addr = Ipv4Addr::new(5, 29, 0, 1);

struct Harness {
    worker: UserEnrichmentWorker,
    users: Arc<InMemoryUserRepository>,
    geolocation: Arc<ScriptedGeolocationSource>,
    holidays: Arc<ScriptedHolidaySource>,
    metrics: Arc<RecordingEnrichmentMetrics>,
    sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    fn new(
        geolocation: Vec<Result<GeoLocation, ExternalSourceError>>,
        holidays: Vec<Result<bool, ExternalSourceError>>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let geolocation = Arc::new(ScriptedGeolocationSource::new(geolocation));
        let holidays = Arc::new(ScriptedHolidaySource::new(holidays));
        let metrics = Arc::new(RecordingEnrichmentMetrics::default());
        let sleeper = Arc::new(RecordingSleeper::default());
        // 2024-04-22 22:00 UTC is already 2024-04-23 in Israel (UTC+3).
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 4, 22, 22, 0, 0)
                .single()
                .expect("valid timestamp"),
        ));
        let worker = UserEnrichmentWorker::with_sleeper(
            UserEnrichmentWorkerPorts::new(
                users.clone(),
                geolocation.clone(),
                holidays.clone(),
                metrics.clone(),
            ),
            clock,
            sleeper.clone(),
            FixedRetryPolicy::default(),
        );
        Self {
            worker,
            users,
            geolocation,
            holidays,
            metrics,
            sleeper,
        }
    }

    async fn store(&self, ip: IpAddr) -> User {
        let user = User::register(
            Username::new("ada").expect("username"),
            EmailAddress::new("ada@example.com").expect("email"),
            ip,
        );
        self.users.upsert(&user).await.expect("seed user");
        user
    }

    async fn reload(&self, user: &User) -> User {
        self.users
            .find_by_id(user.id())
            .await
            .expect("load user")
            .expect("user exists")
    }
}

fn tel_aviv() -> GeoLocation {
    ScriptedGeolocationSource::location(Some("Tel Aviv"), Some("Tel Aviv"), "IL", Some(3))
}

fn job(user: &User) -> UserEnrichmentJob {
    UserEnrichmentJob {
        user_id: *user.id(),
        trace_id: None,
    }
}

fn unavailable() -> ExternalSourceError {
    ExternalSourceError::server_error(503_u16, "Service Unavailable")
}

#[fixture]
fn israel() -> CountryCode {
    CountryCode::new("IL").expect("country")
}

#[rstest]
#[tokio::test]
async fn tel_aviv_signup_on_holiday_is_fully_enriched(israel: CountryCode) {
    let harness = Harness::new(vec![Ok(tel_aviv())], vec![Ok(true)]);
    let user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(report.state(), EnrichmentState::Enriched);
    assert_eq!(
        report.transitions,
        vec![
            EnrichmentState::Created,
            EnrichmentState::GeoPending,
            EnrichmentState::GeoDone,
            EnrichmentState::HolidayPending,
            EnrichmentState::Enriched,
        ]
    );
    assert_eq!(report.geolocation_attempts, 1);

    let stored = harness.reload(&user).await;
    assert_eq!(stored.city(), Some("Tel Aviv"));
    assert_eq!(stored.region(), Some("Tel Aviv"));
    assert_eq!(stored.country(), Some(israel));
    assert_eq!(stored.signup_at_holiday(), Some(true));
    assert_eq!(stored.ip(), IpAddr::V4(TEL_AVIV_IP));

    let expected_date = NaiveDate::from_ymd_opt(2024, 4, 23).expect("date");
    assert_eq!(harness.holidays.requested(), vec![(israel, expected_date)]);
    assert_eq!(harness.metrics.successes().len(), 1);
    assert!(harness.metrics.failures().is_empty());
}

#[rstest]
#[tokio::test]
async fn geolocation_503_five_times_fails_closed() {
    let harness = Harness::new((0..5).map(|_| Err(unavailable())).collect(), vec![]);
    let user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(
        report.state(),
        EnrichmentState::Failed(EnrichmentFailureKind::RetryExhausted)
    );
    assert_eq!(report.geolocation_attempts, 5);
    assert_eq!(harness.geolocation.calls(), 5);
    assert_eq!(harness.sleeper.recorded(), vec![Duration::from_secs(1); 4]);
    assert_eq!(harness.holidays.calls(), 0);

    let stored = harness.reload(&user).await;
    assert_eq!(stored, user);
    assert!(stored.city().is_none());
    assert!(stored.region().is_none());
    assert!(stored.country().is_none());
    assert!(stored.signup_at_holiday().is_none());

    let failures = harness.metrics.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, EnrichmentFailureKind::RetryExhausted);
    assert_eq!(failures[0].attempt_count, 5);
}

#[rstest]
#[tokio::test]
async fn geolocation_recovers_within_retry_budget() {
    let harness = Harness::new(
        vec![Err(unavailable()), Err(unavailable()), Ok(tel_aviv())],
        vec![Ok(false)],
    );
    let user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(report.state(), EnrichmentState::Enriched);
    assert_eq!(report.geolocation_attempts, 3);
    assert_eq!(harness.sleeper.recorded().len(), 2);
    assert_eq!(harness.reload(&user).await.signup_at_holiday(), Some(false));
}

#[rstest]
#[case(IpAddr::V4(Ipv4Addr::LOCALHOST))]
#[case(IpAddr::V6(Ipv6Addr::LOCALHOST))]
#[tokio::test]
async fn loopback_uses_zero_offset_for_holiday_date(#[case] ip: IpAddr, israel: CountryCode) {
    // The service reports +3, which would move the date to the 23rd.
    let harness = Harness::new(vec![Ok(tel_aviv())], vec![Ok(false)]);
    let user = harness.store(ip).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(report.state(), EnrichmentState::Enriched);
    let utc_date = NaiveDate::from_ymd_opt(2024, 4, 22).expect("date");
    assert_eq!(harness.holidays.requested(), vec![(israel, utc_date)]);
}

#[rstest]
#[tokio::test]
async fn loopback_tolerates_missing_timezone() {
    let location = ScriptedGeolocationSource::location(None, None, "US", None);
    let harness = Harness::new(vec![Ok(location)], vec![Ok(false)]);
    let user = harness.store(IpAddr::V4(Ipv4Addr::LOCALHOST)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(report.state(), EnrichmentState::Enriched);
    let stored = harness.reload(&user).await;
    assert!(stored.city().is_none());
    assert_eq!(stored.country().map(|c| c.to_string()), Some("US".to_owned()));
}

#[rstest]
#[case(None)]
#[case(Some(27))]
#[tokio::test]
async fn unusable_offset_is_malformed(#[case] offset: Option<i32>) {
    let location = ScriptedGeolocationSource::location(Some("Tel Aviv"), None, "IL", offset);
    let harness = Harness::new(vec![Ok(location)], vec![Ok(true)]);
    let user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(
        report.state(),
        EnrichmentState::Failed(EnrichmentFailureKind::MalformedResponse)
    );
    assert_eq!(harness.holidays.calls(), 0);
    assert_eq!(harness.reload(&user).await, user);
}

#[rstest]
#[case(
    ExternalSourceError::client_error(401_u16, "invalid api key"),
    EnrichmentFailureKind::SourceRejected
)]
#[case(
    ExternalSourceError::malformed_response("missing country_code"),
    EnrichmentFailureKind::MalformedResponse
)]
#[tokio::test]
async fn permanent_geolocation_errors_do_not_retry(
    #[case] error: ExternalSourceError,
    #[case] expected: EnrichmentFailureKind,
) {
    let harness = Harness::new(vec![Err(error)], vec![]);
    let user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(report.state(), EnrichmentState::Failed(expected));
    assert_eq!(
        report.transitions,
        vec![
            EnrichmentState::Created,
            EnrichmentState::GeoPending,
            EnrichmentState::Failed(expected),
        ]
    );
    assert_eq!(harness.geolocation.calls(), 1);
    assert!(harness.sleeper.recorded().is_empty());
}

#[rstest]
#[case(unavailable(), EnrichmentFailureKind::SourceUnavailable)]
#[case(
    ExternalSourceError::malformed_response("not json"),
    EnrichmentFailureKind::MalformedResponse
)]
#[tokio::test]
async fn holiday_failure_leaves_user_unenriched(
    #[case] error: ExternalSourceError,
    #[case] expected: EnrichmentFailureKind,
) {
    let harness = Harness::new(vec![Ok(tel_aviv())], vec![Err(error)]);
    let user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(report.state(), EnrichmentState::Failed(expected));
    assert_eq!(
        report.transitions.last().copied(),
        Some(EnrichmentState::Failed(expected))
    );
    assert!(report.transitions.contains(&EnrichmentState::HolidayPending));
    // Holiday lookups are single-shot.
    assert_eq!(harness.holidays.calls(), 1);

    let stored = harness.reload(&user).await;
    assert!(stored.enrichment().is_none());
    assert!(stored.city().is_none());
}

#[rstest]
#[tokio::test]
async fn missing_user_fails_from_created() {
    let harness = Harness::new(vec![Ok(tel_aviv())], vec![Ok(true)]);
    let report = harness
        .worker
        .enrich(UserEnrichmentJob {
            user_id: UserId::random(),
            trace_id: None,
        })
        .await;

    assert_eq!(
        report.transitions,
        vec![
            EnrichmentState::Created,
            EnrichmentState::Failed(EnrichmentFailureKind::UserNotFound),
        ]
    );
    assert_eq!(harness.geolocation.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn already_enriched_user_is_not_overwritten(israel: CountryCode) {
    let harness = Harness::new(vec![Ok(tel_aviv())], vec![Ok(true)]);
    let mut user = harness.store(IpAddr::V4(TEL_AVIV_IP)).await;
    user.enrich(UserEnrichment {
        city: Some("Haifa".to_owned()),
        region: None,
        country: israel,
        signup_at_holiday: false,
    })
    .expect("first enrichment");
    harness.users.upsert(&user).await.expect("save enriched");

    let report = harness.worker.enrich(job(&user)).await;

    assert_eq!(
        report.failure(),
        Some(EnrichmentFailureKind::AlreadyEnriched)
    );
    assert_eq!(harness.geolocation.calls(), 0);
    assert_eq!(harness.reload(&user).await.city(), Some("Haifa"));
}

#[rstest]
#[tokio::test]
async fn persistence_failure_is_reported() {
    let user = User::register(
        Username::new("ada").expect("username"),
        EmailAddress::new("ada@example.com").expect("email"),
        IpAddr::V4(TEL_AVIV_IP),
    );
    let loaded = user.clone();
    let mut repository = MockUserRepository::new();
    repository
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(loaded)));
    repository
        .expect_upsert()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::connection("pool exhausted")));

    let mut metrics = MockEnrichmentJobMetrics::new();
    metrics
        .expect_record_failure()
        .withf(|payload| payload.kind == EnrichmentFailureKind::PersistenceFailed)
        .times(1)
        .return_once(|_| Err(EnrichmentJobMetricsError::export("collector offline")));

    let worker = UserEnrichmentWorker::with_sleeper(
        UserEnrichmentWorkerPorts::new(
            Arc::new(repository),
            Arc::new(ScriptedGeolocationSource::new(vec![Ok(tel_aviv())])),
            Arc::new(ScriptedHolidaySource::new(vec![Ok(true)])),
            Arc::new(metrics),
        ),
        Arc::new(MutableClock::new(Utc::now())),
        Arc::new(RecordingSleeper::default()),
        FixedRetryPolicy::default(),
    );

    let report = worker.enrich(job(&user)).await;

    assert_eq!(
        report.failure(),
        Some(EnrichmentFailureKind::PersistenceFailed)
    );
}
