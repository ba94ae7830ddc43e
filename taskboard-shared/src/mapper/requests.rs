/// Create and update request bodies
///
/// Bodies keep dates and enums as raw strings so every coercion failure can
/// be reported against the field that caused it. `into_params` validates,
/// coerces, and builds the query layer input.
///
/// For updates the id in the path is authoritative: any `id` in the body is
/// accepted and then ignored.

use crate::mapper::dates::{parse_date, parse_nullable_timestamp};
use crate::mapper::{parse_enum, MapError};
use crate::models::project::{CreateProjectParams, UpdateProjectParams};
use crate::models::task::{CreateTaskParams, UpdateTaskParams};
use crate::models::user::{CreateUserParams, UpdateUserParams, UserRole};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// `POST /users`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// `user` (default) or `admin`
    #[serde(default)]
    pub role: Option<String>,
}

impl CreateUserRequest {
    pub fn into_params(self) -> Result<CreateUserParams, MapError> {
        self.validate()?;

        let role = match self.role.as_deref() {
            None | Some("") => UserRole::default(),
            Some(role) => parse_enum("role", role)?,
        };

        Ok(CreateUserParams {
            full_name: self.full_name,
            email: self.email,
            role,
        })
    }
}

/// `PUT /users/:id`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// Ignored; the path id wins
    #[serde(default)]
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: String,
}

impl UpdateUserRequest {
    pub fn into_params(self, id: i64) -> Result<UpdateUserParams, MapError> {
        self.validate()?;

        Ok(UpdateUserParams {
            id,
            full_name: self.full_name,
            email: self.email,
            role: parse_enum("role", &self.role)?,
        })
    }
}

/// `POST /projects`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// `YYYY-MM-DD`
    pub start_date: String,

    /// `YYYY-MM-DD`
    pub end_date: String,

    pub manager_id: i64,
}

impl CreateProjectRequest {
    pub fn into_params(self) -> Result<CreateProjectParams, MapError> {
        self.validate()?;

        Ok(CreateProjectParams {
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
            name: self.name,
            description: self.description,
            manager_id: self.manager_id,
        })
    }
}

/// `PUT /projects/:id`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// Ignored; the path id wins
    #[serde(default)]
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub start_date: String,

    pub end_date: String,

    pub manager_id: i64,
}

impl UpdateProjectRequest {
    pub fn into_params(self, id: i64) -> Result<UpdateProjectParams, MapError> {
        self.validate()?;

        Ok(UpdateProjectParams {
            id,
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
            name: self.name,
            description: self.description,
            manager_id: self.manager_id,
        })
    }
}

/// `POST /tasks`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// `low`, `medium` or `high`
    pub priority: String,

    /// `New`, `Pending`, `InProgress` or `Done`
    pub status: String,

    pub assignee_id: i64,

    pub project_id: i64,

    /// Any shape accepted by [`parse_nullable_timestamp`]
    #[serde(default)]
    pub completion_date: Value,
}

impl CreateTaskRequest {
    pub fn into_params(self) -> Result<CreateTaskParams, MapError> {
        self.validate()?;

        Ok(CreateTaskParams {
            priority: parse_enum("priority", &self.priority)?,
            status: parse_enum("status", &self.status)?,
            completion_date: parse_nullable_timestamp("completion_date", &self.completion_date)?,
            title: self.title,
            description: self.description,
            assignee_id: self.assignee_id,
            project_id: self.project_id,
        })
    }
}

/// `PUT /tasks/:id`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// Ignored; the path id wins
    #[serde(default)]
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub priority: String,

    pub status: String,

    pub assignee_id: i64,

    pub project_id: i64,

    /// Omitting it clears any stored completion date
    #[serde(default)]
    pub completion_date: Value,
}

impl UpdateTaskRequest {
    pub fn into_params(self, id: i64) -> Result<UpdateTaskParams, MapError> {
        self.validate()?;

        Ok(UpdateTaskParams {
            id,
            priority: parse_enum("priority", &self.priority)?,
            status: parse_enum("status", &self.status)?,
            completion_date: parse_nullable_timestamp("completion_date", &self.completion_date)?,
            title: self.title,
            description: self.description,
            assignee_id: self.assignee_id,
            project_id: self.project_id,
        })
    }
}
