//! HTTP adapters exercised against a local stand-in for the hosted APIs.
//!
//! A throwaway actix server answers on an ephemeral port so the real
//! reqwest transport, query encoding, and status mapping are covered.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpResponse, HttpServer, web};
use chrono::NaiveDate;
use rstest::rstest;
use serde_json::json;
use url::Url;

use social_backend::domain::ports::{
    EmailValidationSource, ExternalSourceError, GeolocationSource, HolidaySource,
};
use social_backend::domain::{CountryCode, EmailAddress};
use social_backend::outbound::abstract_api::{
    AbstractApiServiceConfig, ApiKey, HttpEmailValidationSource, HttpGeolocationSource,
    HttpHolidaySource,
};

const API_KEY: &str = "test-key";

type Requests = Mutex<Vec<HashMap<String, String>>>;
type Query = web::Query<HashMap<String, String>>;

fn record(seen: &web::Data<Requests>, query: &Query) {
    seen.lock().expect("seen lock").push(query.0.clone());
}

async fn email(seen: web::Data<Requests>, query: Query) -> HttpResponse {
    record(&seen, &query);
    let valid = query.get("email").is_some_and(|email| email.contains('@'));
    HttpResponse::Ok().json(json!({
        "email": query.get("email"),
        "is_valid_format": { "value": valid, "text": if valid { "TRUE" } else { "FALSE" } },
    }))
}

async fn geolocation(
    seen: web::Data<Requests>,
    query: Query,
) -> HttpResponse {
    record(&seen, &query);
    HttpResponse::Ok().json(json!({
        "ip_address": query.get("ip_address"),
        "city": "Tel Aviv",
        "region": "Tel Aviv",
        "country_code": "IL",
        "timezone": { "name": "Asia/Jerusalem", "gmt_offset": 3, "is_dst": true },
    }))
}

async fn holidays(
    seen: web::Data<Requests>,
    query: Query,
) -> HttpResponse {
    record(&seen, &query);
    if query.get("day").map(String::as_str) == Some("14") {
        HttpResponse::Ok().json(json!([{ "name": "Independence Day", "country": "IL" }]))
    } else {
        HttpResponse::Ok().json(json!([]))
    }
}

async fn unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().body("try later")
}

async fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": { "message": "invalid api key" } }))
}

async fn request_timeout() -> HttpResponse {
    HttpResponse::RequestTimeout().finish()
}

async fn garbage() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body("<html></html>")
}

async fn slow() -> HttpResponse {
    tokio::time::sleep(Duration::from_secs(2)).await;
    HttpResponse::Ok().json(json!([]))
}

struct FakeApi {
    addr: SocketAddr,
    seen: Arc<Requests>,
    handle: ServerHandle,
}

impl FakeApi {
    fn start() -> Self {
        let seen: Arc<Requests> = Arc::default();
        let data = web::Data::from(seen.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/email/", web::get().to(email))
                .route("/geo/", web::get().to(geolocation))
                .route("/holidays/", web::get().to(holidays))
                .route("/unavailable/", web::get().to(unavailable))
                .route("/unauthorized/", web::get().to(unauthorized))
                .route("/request-timeout/", web::get().to(request_timeout))
                .route("/garbage/", web::get().to(garbage))
                .route("/slow/", web::get().to(slow))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind fake api");
        let addr = *server.addrs().first().expect("bound address");
        let running = server.run();
        let handle = running.handle();
        actix_rt::spawn(running);
        Self { addr, seen, handle }
    }

    fn config(&self, path: &str) -> AbstractApiServiceConfig {
        self.config_with_timeout(path, Duration::from_secs(5))
    }

    fn config_with_timeout(&self, path: &str, timeout: Duration) -> AbstractApiServiceConfig {
        let endpoint = Url::parse(&format!("http://{}/{path}/", self.addr)).expect("endpoint");
        AbstractApiServiceConfig::new(endpoint, ApiKey::new(API_KEY), timeout)
    }

    fn seen(&self) -> Vec<HashMap<String, String>> {
        self.seen.lock().expect("seen lock").clone()
    }

    async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn country(code: &str) -> CountryCode {
    CountryCode::new(code).expect("country")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("date")
}

#[rstest]
#[case("ada@example.com", true)]
#[case("not-an-email", false)]
#[actix_rt::test]
async fn email_adapter_reads_validity_flag(#[case] raw: &str, #[case] expected: bool) {
    let api = FakeApi::start();
    let source = HttpEmailValidationSource::new(api.config("email")).expect("client");
    let email = EmailAddress::new(raw).expect("email");

    assert_eq!(source.check_format(&email).await, Ok(expected));

    let seen = api.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("api_key").map(String::as_str), Some(API_KEY));
    assert_eq!(seen[0].get("email").map(String::as_str), Some(raw));
    api.stop().await;
}

#[actix_rt::test]
async fn geolocation_adapter_decodes_location() {
    let api = FakeApi::start();
    let source = HttpGeolocationSource::new(api.config("geo")).expect("client");
    let ip = IpAddr::V4(Ipv4Addr::new(5, 29, 0, 1));

    let location = source.locate(ip).await.expect("location");

    assert_eq!(location.city.as_deref(), Some("Tel Aviv"));
    assert_eq!(location.region.as_deref(), Some("Tel Aviv"));
    assert_eq!(location.country_code, country("IL"));
    assert_eq!(location.gmt_offset_hours, Some(3));
    let seen = api.seen();
    assert_eq!(seen[0].get("ip_address").map(String::as_str), Some("5.29.0.1"));
    assert_eq!(seen[0].get("api_key").map(String::as_str), Some(API_KEY));
    api.stop().await;
}

#[rstest]
#[case(date(2024, 5, 14), true)]
#[case(date(2024, 5, 15), false)]
#[actix_rt::test]
async fn holiday_adapter_uses_body_truthiness(#[case] day: NaiveDate, #[case] expected: bool) {
    let api = FakeApi::start();
    let source = HttpHolidaySource::new(api.config("holidays")).expect("client");

    assert_eq!(source.is_holiday(country("IL"), day).await, Ok(expected));

    let seen = api.seen();
    assert_eq!(seen[0].get("country").map(String::as_str), Some("IL"));
    assert_eq!(seen[0].get("year").map(String::as_str), Some("2024"));
    assert_eq!(seen[0].get("month").map(String::as_str), Some("5"));
    api.stop().await;
}

#[actix_rt::test]
async fn server_errors_keep_status_and_are_transient() {
    let api = FakeApi::start();
    let source = HttpHolidaySource::new(api.config("unavailable")).expect("client");

    let error = source
        .is_holiday(country("IL"), date(2024, 5, 14))
        .await
        .expect_err("503 surfaces");

    assert_eq!(error, ExternalSourceError::server_error(503_u16, "try later"));
    assert!(error.is_transient());
    api.stop().await;
}

#[actix_rt::test]
async fn client_errors_are_permanent() {
    let api = FakeApi::start();
    let source = HttpGeolocationSource::new(api.config("unauthorized")).expect("client");

    let error = source
        .locate(IpAddr::V4(Ipv4Addr::new(5, 29, 0, 1)))
        .await
        .expect_err("401 surfaces");

    assert!(matches!(
        error,
        ExternalSourceError::ClientError { status: 401, .. }
    ));
    assert!(!error.is_transient());
    api.stop().await;
}

#[actix_rt::test]
async fn request_timeout_status_is_not_retryable() {
    let api = FakeApi::start();
    let source = HttpEmailValidationSource::new(api.config("request-timeout")).expect("client");
    let email = EmailAddress::new("ada@example.com").expect("email");

    let error = source.check_format(&email).await.expect_err("408 surfaces");

    assert!(matches!(
        error,
        ExternalSourceError::ClientError { status: 408, .. }
    ));
    assert!(!error.is_transient());
    api.stop().await;
}

#[actix_rt::test]
async fn undecodable_bodies_are_malformed() {
    let api = FakeApi::start();
    let source = HttpEmailValidationSource::new(api.config("garbage")).expect("client");
    let email = EmailAddress::new("ada@example.com").expect("email");

    let error = source.check_format(&email).await.expect_err("html rejected");

    assert!(matches!(error, ExternalSourceError::MalformedResponse { .. }));
    api.stop().await;
}

#[actix_rt::test]
async fn slow_responses_time_out_without_leaking_the_key() {
    let api = FakeApi::start();
    let source = HttpHolidaySource::new(
        api.config_with_timeout("slow", Duration::from_millis(200)),
    )
    .expect("client");

    let error = source
        .is_holiday(country("IL"), date(2024, 5, 14))
        .await
        .expect_err("times out");

    assert!(matches!(error, ExternalSourceError::Timeout { .. }));
    assert!(!error.to_string().contains(API_KEY));
    api.stop().await;
}
