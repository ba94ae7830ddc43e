/// Per-request query context
///
/// Every query layer operation receives a [`QueryContext`]. It carries a
/// cancellation token and an optional deadline; [`QueryContext::run`] races the
/// store call against both and drops the store future as soon as either fires,
/// so no query can block a request indefinitely.
///
/// Contexts are usually derived from a long-lived parent token (the server's
/// shutdown token) so that cancelling the parent aborts every in-flight query.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use taskboard_shared::db::context::QueryContext;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), taskboard_shared::error::QueryError> {
/// let shutdown = CancellationToken::new();
/// let ctx = QueryContext::child_of(&shutdown, Some(Duration::from_secs(5)));
///
/// let one: i32 = ctx
///     .run(sqlx::query_scalar("SELECT 1").fetch_one(&pool))
///     .await?;
/// # Ok(())
/// # }
/// ```

use crate::error::{QueryError, QueryResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline for one request
#[derive(Debug, Clone)]
pub struct QueryContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// Context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Context with its own token and a deadline `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Context cancelled whenever `parent` is cancelled
    pub fn child_of(parent: &CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel: parent.child_token(),
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// Token observed by [`QueryContext::run`]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels every operation running under this context
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs a store operation under this context
    ///
    /// Returns [`QueryError::Cancelled`] if the token fires first and
    /// [`QueryError::Timeout`] if the deadline passes first. An already
    /// cancelled context never polls `op`.
    pub async fn run<T, E, F>(&self, op: F) -> QueryResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<QueryError>,
    {
        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(QueryError::Cancelled),
                res = op => res.map_err(Into::into),
            }
        };

        match self.deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, guarded).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!("Query deadline exceeded, aborting store call");
                    Err(QueryError::Timeout)
                }
            },
            None => guarded.await,
        }
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::background()
    }
}
