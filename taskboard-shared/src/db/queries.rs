/// The PostgreSQL-backed query handle
///
/// [`Queries`] owns a clone of the connection pool and implements the
/// per-entity query traits ([`UserQueries`], [`ProjectQueries`],
/// [`TaskQueries`]) in the corresponding `models` modules. The umbrella
/// [`Querier`] trait is what the HTTP layer holds, as `Arc<dyn Querier>`, so
/// handlers can be exercised against an in-memory implementation.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::context::QueryContext;
/// use taskboard_shared::db::queries::Queries;
/// use taskboard_shared::models::project::{CreateProjectParams, ProjectQueries};
/// use chrono::NaiveDate;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let queries = Queries::new(pool);
/// let ctx = QueryContext::background();
///
/// let project = queries
///     .create_project(&ctx, CreateProjectParams {
///         name: "Test Project".to_string(),
///         description: String::new(),
///         start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         end_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///         manager_id: 123,
///     })
///     .await?;
///
/// let same = queries.get_project(&ctx, project.id).await?;
/// assert_eq!(project, same);
/// # Ok(())
/// # }
/// ```

use crate::db::context::QueryContext;
use crate::db::pool;
use crate::error::QueryResult;
use crate::models::project::ProjectQueries;
use crate::models::task::TaskQueries;
use crate::models::user::UserQueries;
use async_trait::async_trait;
use sqlx::PgPool;

/// Every query the service issues, across all entities
#[async_trait]
pub trait Querier: UserQueries + ProjectQueries + TaskQueries + Send + Sync {
    /// Checks that the store is reachable
    async fn ping(&self, ctx: &QueryContext) -> QueryResult<()>;
}

/// Query handle over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct Queries {
    pool: PgPool,
}

impl Queries {
    /// Wraps an already-connected pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Querier for Queries {
    async fn ping(&self, ctx: &QueryContext) -> QueryResult<()> {
        ctx.run(pool::health_check(&self.pool)).await
    }
}
