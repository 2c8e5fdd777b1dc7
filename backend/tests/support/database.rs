//! Helpers for suites that need a live PostgreSQL database.
//!
//! Database suites run against the server named by
//! `SOCIAL_TEST_DATABASE_URL`. When the variable is unset the suites print a
//! skip marker and pass, so local runs without PostgreSQL stay green; CI sets
//! the variable to make them mandatory.

/// Environment variable naming the test database.
pub const TEST_DATABASE_URL_ENV: &str = "SOCIAL_TEST_DATABASE_URL";

/// Return the configured test database URL, or print a skip marker.
pub fn test_database_url(suite: &str) -> Option<String> {
    match std::env::var(TEST_DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-TEST-DATABASE: {suite}: {TEST_DATABASE_URL_ENV} is not set");
            None
        }
    }
}

static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

/// Apply embedded migrations once per test binary.
///
/// Suites run in parallel; concurrent migration runs would race on the
/// migrations table.
pub async fn migrate_once(url: &str) {
    MIGRATED
        .get_or_init(|| async {
            social_backend::outbound::persistence::run_migrations(url)
                .await
                .expect("migrations apply");
        })
        .await;
}
