/// Schema migrations
///
/// Migration files live in `migrations/` at the workspace root and are
/// embedded at compile time. They are applied in filename order exactly once;
/// sqlx records each applied version in `_sqlx_migrations`, which makes
/// repeated startup runs no-ops.
///
/// ```text
/// migrations/
/// ├── 20240101000001_create_users.sql
/// ├── 20240101000002_create_projects.sql
/// └── 20240101000003_create_tasks.sql
/// ```

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::{error, info};

/// Embedded migration set
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applies every pending migration
///
/// # Errors
///
/// Fails if a migration script errors or an already-applied migration was
/// modified on disk.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Applying database migrations"
    );

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Number of successfully applied migrations recorded in the database
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
}
