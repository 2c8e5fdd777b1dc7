//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Saves are a single `INSERT .. ON CONFLICT (id) DO UPDATE` so writing the
//! same user twice leaves one row. The unique index on `username` surfaces as
//! [`UserPersistenceError::Conflict`].

use std::net::IpAddr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CountryCode, EmailAddress, User, UserEnrichment, UserId, Username};

use super::models::{UserRow, UserWrite};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        query: users::BoxedQuery<'static, diesel::pg::Pg>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = query
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserPersistenceError::conflict(info.constraint_name().unwrap_or("unique constraint"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

fn user_to_write(user: &User) -> UserWrite<'_> {
    let enrichment = user.enrichment();
    UserWrite {
        id: *user.id().as_uuid(),
        username: user.username().as_ref(),
        email: user.email().as_ref(),
        ip: user.ip().to_string(),
        city: user.city(),
        region: user.region(),
        country: enrichment.map(|e| e.country.as_str()),
        signup_at_holiday: enrichment.map(|e| e.signup_at_holiday),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let corrupt = |field: &str, err: &dyn std::fmt::Display| {
        UserPersistenceError::corrupt(format!("user {}: {field}: {err}", row.id))
    };

    let username = Username::new(row.username.clone()).map_err(|err| corrupt("username", &err))?;
    let email = EmailAddress::new(&row.email).map_err(|err| corrupt("email", &err))?;
    let ip: IpAddr = row.ip.parse().map_err(|err| corrupt("ip", &err))?;

    let enrichment = match (row.country.as_deref(), row.signup_at_holiday) {
        (Some(country), Some(signup_at_holiday)) => Some(UserEnrichment {
            city: row.city.clone(),
            region: row.region.clone(),
            country: CountryCode::new(country).map_err(|err| corrupt("country", &err))?,
            signup_at_holiday,
        }),
        (None, None) => None,
        _ => {
            return Err(corrupt("enrichment", &"partially written"));
        }
    };

    Ok(User::from_parts(
        UserId::from_uuid(row.id),
        username,
        email,
        ip,
        enrichment,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let write = user_to_write(user);

        diesel::insert_into(users::table)
            .values(&write)
            .on_conflict(users::id)
            .do_update()
            .set((
                users::username.eq(excluded(users::username)),
                users::email.eq(excluded(users::email)),
                users::ip.eq(excluded(users::ip)),
                users::city.eq(excluded(users::city)),
                users::region.eq(excluded(users::region)),
                users::country.eq(excluded(users::country)),
                users::signup_at_holiday.eq(excluded(users::signup_at_holiday)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let query = users::table.filter(users::id.eq(*id.as_uuid())).into_boxed();
        self.find_one(query).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let query = users::table
            .filter(users::username.eq(username.as_ref().to_owned()))
            .into_boxed();
        self.find_one(query).await
    }
}
