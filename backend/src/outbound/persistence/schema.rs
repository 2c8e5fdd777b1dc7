//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes the table.

diesel::table! {
    /// Registered users and their enrichment attributes.
    ///
    /// The four enrichment columns are NULL until the background run
    /// succeeds, and are then written together.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Email address accepted at signup.
        email -> Varchar,
        /// Signup origin address in textual form.
        ip -> Text,
        /// Resolved city.
        city -> Nullable<Text>,
        /// Resolved region.
        region -> Nullable<Text>,
        /// Resolved ISO 3166-1 alpha-2 country code.
        country -> Nullable<Varchar>,
        /// Whether the local signup date was a public holiday.
        signup_at_holiday -> Nullable<Bool>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}
