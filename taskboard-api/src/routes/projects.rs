/// Project endpoints
///
/// # Endpoints
///
/// - `GET /projects` - List projects in insertion order
/// - `POST /projects` - Create project
/// - `GET /projects/search?name=…|manager_id=…` - Search
/// - `GET /projects/:id` - Fetch project
/// - `PUT /projects/:id` - Overwrite project
/// - `DELETE /projects/:id` - Delete project
/// - `GET /projects/:id/tasks` - Tasks in the project
///
/// Dates are exchanged as `YYYY-MM-DD`.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use taskboard_shared::mapper::requests::{CreateProjectRequest, UpdateProjectRequest};
use taskboard_shared::mapper::search::{ProjectSearch, ProjectSearchQuery};
use taskboard_shared::models::project::{Project, ProjectQueries};
use taskboard_shared::models::task::{Task, TaskQueries};

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.querier.list_projects(&state.query_context()).await?;
    Ok(Json(projects))
}

/// Create project
///
/// # Endpoint
///
/// ```text
/// POST /projects
/// Content-Type: application/json
///
/// {
///   "name": "Test Project",
///   "description": "A test project",
///   "start_date": "2024-01-01",
///   "end_date": "2024-02-01",
///   "manager_id": 123
/// }
/// ```
///
/// `manager_id` is not checked against existing users.
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Json(req) = body?;
    let params = req.into_params()?;

    let project = state
        .querier
        .create_project(&state.query_context(), params)
        .await?;

    tracing::info!(project_id = project.id, manager_id = project.manager_id, "Project created");
    Ok(Json(project))
}

/// Search projects by `name`, else by `manager_id`
pub async fn search_projects(
    State(state): State<AppState>,
    query: Result<Query<ProjectSearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Project>>> {
    let Query(query) = query?;
    let ctx = state.query_context();

    let projects = match query.into_criterion()? {
        ProjectSearch::Name(name) => state.querier.search_projects_by_name(&ctx, &name).await?,
        ProjectSearch::Manager(manager_id) => {
            state
                .querier
                .search_projects_by_manager(&ctx, manager_id)
                .await?
        }
    };

    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = path?;
    let project = state.querier.get_project(&state.query_context(), id).await?;
    Ok(Json(project))
}

/// Overwrite a project; the path id wins
pub async fn update_project(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = path?;
    let Json(req) = body?;
    let params = req.into_params(id)?;

    let project = state
        .querier
        .update_project(&state.query_context(), params)
        .await?;

    tracing::info!(project_id = id, "Project updated");
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state
        .querier
        .delete_project(&state.query_context(), id)
        .await?;

    tracing::info!(project_id = id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Tasks belonging to a project, ordered by creation date
pub async fn get_project_tasks(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(id) = path?;
    let tasks = state
        .querier
        .search_tasks_by_project(&state.query_context(), id)
        .await?;
    Ok(Json(tasks))
}
