/// Database layer
///
/// - `pool`: connection pool construction and health checks
/// - `migrations`: embedded schema migrations
/// - `context`: per-request cancellation and deadlines
/// - `queries`: the `Queries` handle and the `Querier` trait
///
/// The SQL for each entity lives next to its model in `crate::models`.

pub mod context;
pub mod migrations;
pub mod pool;
pub mod queries;
