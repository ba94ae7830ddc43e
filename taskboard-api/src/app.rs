/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::db::pool::create_pool;
/// use taskboard_shared::db::queries::Queries;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(&config.database.pool).await?;
/// let state = AppState::new(Arc::new(Queries::new(pool)), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use taskboard_shared::db::context::QueryContext;
use taskboard_shared::db::queries::Querier;
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Store access
    pub querier: Arc<dyn Querier>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Cancelled on shutdown; every request context derives from it
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates new application state
    pub fn new(querier: Arc<dyn Querier>, config: Config) -> Self {
        Self {
            querier,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// Context for the queries of one request
    pub fn query_context(&self) -> QueryContext {
        QueryContext::child_of(&self.shutdown, Some(self.config.request_timeout()))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check
/// ├── /users
/// │   ├── GET, POST /
/// │   ├── GET    /search?name=|email=
/// │   ├── GET, PUT, DELETE /:id
/// │   └── GET    /:id/tasks
/// ├── /projects
/// │   ├── GET, POST /
/// │   ├── GET    /search?name=|manager_id=
/// │   ├── GET, PUT, DELETE /:id
/// │   └── GET    /:id/tasks
/// └── /tasks
///     ├── GET, POST /
///     ├── GET    /search?title=|status=|priority=|assignee_id=|project_id=
///     └── GET, PUT, DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Response compression
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{health, projects, tasks, users};

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/search", get(users::search_users))
        .route(
            "/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/:id/tasks", get(users::get_user_tasks));

    let project_routes = Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route("/search", get(projects::search_projects))
        .route(
            "/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/:id/tasks", get(projects::get_project_tasks));

    let task_routes = Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/search", get(tasks::search_tasks))
        .route(
            "/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::testing::InMemoryQuerier;

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://localhost/test".to_string()),
            "REQUEST_TIMEOUT_SECS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_context_follows_shutdown() {
        let state = AppState::new(Arc::new(InMemoryQuerier::new()), test_config());
        let ctx = state.query_context();

        assert!(ctx.deadline().is_some());
        assert!(!ctx.cancel_token().is_cancelled());

        state.shutdown.cancel();
        assert!(ctx.cancel_token().is_cancelled());
    }
}
