/// User endpoints
///
/// # Endpoints
///
/// - `GET /users` - List users, ordered by name
/// - `POST /users` - Create user
/// - `GET /users/search?name=…|email=…` - Substring search
/// - `GET /users/:id` - Fetch user
/// - `PUT /users/:id` - Overwrite user
/// - `DELETE /users/:id` - Delete user
/// - `GET /users/:id/tasks` - Tasks assigned to the user

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use taskboard_shared::mapper::requests::{CreateUserRequest, UpdateUserRequest};
use taskboard_shared::mapper::search::{UserSearch, UserSearchQuery};
use taskboard_shared::models::task::{Task, TaskQueries};
use taskboard_shared::models::user::{User, UserQueries};

/// List users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.querier.list_users(&state.query_context()).await?;
    Ok(Json(users))
}

/// Create user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// {
///   "full_name": "Test User",
///   "email": "test@example.com",
///   "role": "admin"
/// }
/// ```
///
/// `role` is optional and defaults to `user`. The response is the stored user
/// with its `id` and `registration_date`.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, empty name, bad email or unknown role
/// - `500 Internal Server Error`: Store failure (including a duplicate email)
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(req) = body?;
    let params = req.into_params()?;

    let user = state
        .querier
        .create_user(&state.query_context(), params)
        .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User created");
    Ok(Json(user))
}

/// Search users by `name`, else by `email`
pub async fn search_users(
    State(state): State<AppState>,
    query: Result<Query<UserSearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<User>>> {
    let Query(query) = query?;
    let ctx = state.query_context();

    let users = match query.into_criterion()? {
        UserSearch::Name(name) => state.querier.search_users_by_name(&ctx, &name).await?,
        UserSearch::Email(email) => state.querier.search_users_by_email(&ctx, &email).await?,
    };

    Ok(Json(users))
}

/// Fetch one user
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = path?;
    let user = state.querier.get_user(&state.query_context(), id).await?;
    Ok(Json(user))
}

/// Overwrite a user
///
/// The id in the path wins over any `id` in the body.
pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = path?;
    let Json(req) = body?;
    let params = req.into_params(id)?;

    let user = state
        .querier
        .update_user(&state.query_context(), params)
        .await?;

    tracing::info!(user_id = id, "User updated");
    Ok(Json(user))
}

/// Delete a user
///
/// Tasks and projects referring to the user are left untouched.
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    state.querier.delete_user(&state.query_context(), id).await?;

    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Tasks assigned to a user
///
/// The user itself is not looked up: an unknown id yields an empty list.
pub async fn get_user_tasks(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Path(id) = path?;
    let tasks = state
        .querier
        .search_tasks_by_assignee(&state.query_context(), id)
        .await?;
    Ok(Json(tasks))
}
