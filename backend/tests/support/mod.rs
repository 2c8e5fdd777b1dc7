//! Shared helpers for integration test suites.

pub mod database;
