/// Task endpoints
///
/// # Endpoints
///
/// - `GET /tasks` - List tasks, ordered by creation date
/// - `POST /tasks` - Create task
/// - `GET /tasks/search?title=…|status=…|priority=…|assignee_id=…|project_id=…`
/// - `GET /tasks/:id` - Fetch task
/// - `PUT /tasks/:id` - Overwrite task
/// - `DELETE /tasks/:id` - Delete task
///
/// # Task body
///
/// ```json
/// {
///   "title": "Sample Task",
///   "description": "This is a sample task",
///   "priority": "medium",
///   "status": "Pending",
///   "assignee_id": 1,
///   "project_id": 1,
///   "completion_date": "2024-03-01"
/// }
/// ```
///
/// `priority` is one of `low`, `medium`, `high`; `status` one of `New`,
/// `Pending`, `InProgress`, `Done`. `completion_date` may be omitted, `null`,
/// `""`, a date or timestamp string, or `{"time": …, "valid": …}`.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use taskboard_shared::mapper::requests::{CreateTaskRequest, UpdateTaskRequest};
use taskboard_shared::mapper::search::{TaskSearch, TaskSearchQuery};
use taskboard_shared::models::task::{Task, TaskQueries};

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.querier.list_tasks(&state.query_context()).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = body?;
    let params = req.into_params()?;

    let task = state
        .querier
        .create_task(&state.query_context(), params)
        .await?;

    tracing::info!(
        task_id = task.id,
        project_id = task.project_id,
        status = %task.status,
        "Task created"
    );
    Ok(Json(task))
}

/// Search tasks by the first non-empty criterion
///
/// Precedence: `title`, `status`, `priority`, `assignee_id`, `project_id`.
pub async fn search_tasks(
    State(state): State<AppState>,
    query: Result<Query<TaskSearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(query) = query?;
    let ctx = state.query_context();
    let q = &state.querier;

    let tasks = match query.into_criterion()? {
        TaskSearch::Title(title) => q.search_tasks_by_title(&ctx, &title).await?,
        TaskSearch::Status(status) => q.search_tasks_by_status(&ctx, status).await?,
        TaskSearch::Priority(priority) => q.search_tasks_by_priority(&ctx, priority).await?,
        TaskSearch::Assignee(assignee_id) => q.search_tasks_by_assignee(&ctx, assignee_id).await?,
        TaskSearch::Project(project_id) => q.search_tasks_by_project(&ctx, project_id).await?,
    };

    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let task = state.querier.get_task(&state.query_context(), id).await?;
    Ok(Json(task))
}

/// Overwrite a task; the path id wins
///
/// Omitting `completion_date` clears it.
pub async fn update_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = path?;
    let Json(req) = body?;
    let params = req.into_params(id)?;

    let task = state
        .querier
        .update_task(&state.query_context(), params)
        .await?;

    tracing::info!(task_id = id, status = %task.status, "Task updated");
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.querier.delete_task(&state.query_context(), id).await?;

    tracing::info!(task_id = id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
