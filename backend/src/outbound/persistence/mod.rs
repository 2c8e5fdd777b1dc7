//! User record storage adapters.
//!
//! Two implementations of the domain `UserRepository` port live here:
//!
//! - [`DieselUserRepository`] persists users in PostgreSQL through
//!   `diesel-async` and a `bb8` pool. Row structs (`models.rs`) and the
//!   schema (`schema.rs`) stay internal to this module.
//! - [`InMemoryUserRepository`] keeps users in process memory for local runs
//!   and tests.
//!
//! # Example
//!
//! ```ignore
//! use social_backend::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/social");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_user_repository;
mod in_memory_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
