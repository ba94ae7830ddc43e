//! # Taskboard Shared Library
//!
//! Data layer for the Taskboard API: entity models, the query traits and
//! their PostgreSQL implementation, and the mapping from raw request data to
//! typed query parameters.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, migrations, per-request query context, `Querier`
//! - `models`: users, projects and tasks with their query traits
//! - `mapper`: request bodies and search criteria to query parameters
//! - `error`: query layer error type
//! - `testing`: in-memory `Querier` (feature `testing`)

pub mod db;
pub mod error;
pub mod mapper;
pub mod models;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
