//! Internal Diesel row structs for the users table.
//!
//! These types never leave the persistence layer; the repository converts
//! them to and from domain users.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::users;

/// Row struct for reading from the users table.
///
/// Audit timestamps are maintained by the database and not selected.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub ip: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub signup_at_holiday: Option<bool>,
}

/// Full-record write; the conflict update copies every column from the
/// proposed row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct UserWrite<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub ip: String,
    pub city: Option<&'a str>,
    pub region: Option<&'a str>,
    pub country: Option<&'a str>,
    pub signup_at_holiday: Option<bool>,
}
