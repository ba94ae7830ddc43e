/// Query layer error types
///
/// Every query operation returns [`QueryResult`]. Store failures pass through
/// untouched as [`QueryError::Store`]; the only normalization performed is that
/// "zero rows matched" on a single-row get/update/delete becomes
/// [`QueryError::NotFound`], so callers never have to inspect driver errors to
/// produce a 404.

use thiserror::Error;

/// Query layer result type alias
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors produced by the query layer
#[derive(Error, Debug)]
pub enum QueryError {
    /// No row matched a single-row query
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind (e.g. "user")
        entity: &'static str,

        /// Requested id
        id: i64,
    },

    /// The request's cancellation token fired before the store answered
    #[error("query cancelled")]
    Cancelled,

    /// The request's deadline passed before the store answered
    #[error("query timed out")]
    Timeout,

    /// Any other persistence failure, passed through verbatim
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
}

impl QueryError {
    /// Shorthand for building a [`QueryError::NotFound`]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        QueryError::NotFound { entity, id }
    }

    /// Returns true for the normalized "zero rows" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }
}
