/// Task model and queries
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
/// CREATE TYPE task_status AS ENUM ('New', 'Pending', 'InProgress', 'Done');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     priority task_priority NOT NULL,
///     status task_status NOT NULL,
///     assignee_id BIGINT NOT NULL,
///     project_id BIGINT NOT NULL,
///     creation_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completion_date TIMESTAMPTZ
/// );
/// ```
///
/// Priority and status are closed enums. Their string forms are exactly what
/// the PostgreSQL enum types store, so the JSON payloads and the database
/// agree. Listings and searches are ordered by `creation_date`, then `id`.

use crate::db::context::QueryContext;
use crate::db::queries::Queries;
use crate::error::{QueryError, QueryResult};
use crate::models::{contains_pattern, ParseEnumError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(ParseEnumError {
                kind: "task priority",
                value: other.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

/// Task workflow status
///
/// Stored with the variant names as-is (`New`, `InProgress`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    New,
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::New => "New",
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(TaskStatus::New),
            "Pending" => Ok(TaskStatus::Pending),
            "InProgress" => Ok(TaskStatus::InProgress),
            "Done" => Ok(TaskStatus::Done),
            other => Err(ParseEnumError {
                kind: "task status",
                value: other.to_string(),
                expected: "New, Pending, InProgress, Done",
            }),
        }
    }
}

/// A task as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Store-assigned id
    pub id: i64,

    pub title: String,

    pub description: String,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Assigned user (not enforced)
    pub assignee_id: i64,

    /// Owning project (not enforced)
    pub project_id: i64,

    /// Set by the store on insert
    pub creation_date: DateTime<Utc>,

    /// Present only once the task is finished
    pub completion_date: Option<DateTime<Utc>>,
}

/// Input for [`TaskQueries::create_task`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskParams {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee_id: i64,
    pub project_id: i64,
    pub completion_date: Option<DateTime<Utc>>,
}

/// Input for [`TaskQueries::update_task`]
///
/// Overwrites every field, including clearing `completion_date` when it is
/// `None`. `creation_date` is immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskParams {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee_id: i64,
    pub project_id: i64,
    pub completion_date: Option<DateTime<Utc>>,
}

/// Task queries
#[async_trait]
pub trait TaskQueries: Send + Sync {
    async fn create_task(&self, ctx: &QueryContext, params: CreateTaskParams) -> QueryResult<Task>;

    async fn get_task(&self, ctx: &QueryContext, id: i64) -> QueryResult<Task>;

    async fn list_tasks(&self, ctx: &QueryContext) -> QueryResult<Vec<Task>>;

    async fn update_task(&self, ctx: &QueryContext, params: UpdateTaskParams) -> QueryResult<Task>;

    async fn delete_task(&self, ctx: &QueryContext, id: i64) -> QueryResult<()>;

    /// Tasks whose title contains `title`, ignoring case
    async fn search_tasks_by_title(&self, ctx: &QueryContext, title: &str) -> QueryResult<Vec<Task>>;

    async fn search_tasks_by_status(
        &self,
        ctx: &QueryContext,
        status: TaskStatus,
    ) -> QueryResult<Vec<Task>>;

    async fn search_tasks_by_priority(
        &self,
        ctx: &QueryContext,
        priority: TaskPriority,
    ) -> QueryResult<Vec<Task>>;

    /// Tasks assigned to a user
    async fn search_tasks_by_assignee(
        &self,
        ctx: &QueryContext,
        assignee_id: i64,
    ) -> QueryResult<Vec<Task>>;

    /// Tasks belonging to a project
    async fn search_tasks_by_project(
        &self,
        ctx: &QueryContext,
        project_id: i64,
    ) -> QueryResult<Vec<Task>>;
}

#[async_trait]
impl TaskQueries for Queries {
    async fn create_task(&self, ctx: &QueryContext, params: CreateTaskParams) -> QueryResult<Task> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, priority, status, assignee_id, project_id, completion_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, priority, status, assignee_id, project_id,
                      creation_date, completion_date
            "#,
        )
        .bind(params.title)
        .bind(params.description)
        .bind(params.priority)
        .bind(params.status)
        .bind(params.assignee_id)
        .bind(params.project_id)
        .bind(params.completion_date)
        .fetch_one(self.pool());

        ctx.run(query).await
    }

    async fn get_task(&self, ctx: &QueryContext, id: i64) -> QueryResult<Task> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool());

        ctx.run(query)
            .await?
            .ok_or_else(|| QueryError::not_found("task", id))
    }

    async fn list_tasks(&self, ctx: &QueryContext) -> QueryResult<Vec<Task>> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            ORDER BY creation_date ASC, id ASC
            "#,
        )
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn update_task(&self, ctx: &QueryContext, params: UpdateTaskParams) -> QueryResult<Task> {
        let id = params.id;
        let query = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, priority = $4, status = $5,
                assignee_id = $6, project_id = $7, completion_date = $8
            WHERE id = $1
            RETURNING id, title, description, priority, status, assignee_id, project_id,
                      creation_date, completion_date
            "#,
        )
        .bind(id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.priority)
        .bind(params.status)
        .bind(params.assignee_id)
        .bind(params.project_id)
        .bind(params.completion_date)
        .fetch_optional(self.pool());

        ctx.run(query)
            .await?
            .ok_or_else(|| QueryError::not_found("task", id))
    }

    async fn delete_task(&self, ctx: &QueryContext, id: i64) -> QueryResult<()> {
        let query = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool());

        let result = ctx.run(query).await?;
        if result.rows_affected() == 0 {
            return Err(QueryError::not_found("task", id));
        }

        Ok(())
    }

    async fn search_tasks_by_title(&self, ctx: &QueryContext, title: &str) -> QueryResult<Vec<Task>> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            WHERE title ILIKE $1 ESCAPE '\'
            ORDER BY creation_date ASC, id ASC
            "#,
        )
        .bind(contains_pattern(title))
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn search_tasks_by_status(
        &self,
        ctx: &QueryContext,
        status: TaskStatus,
    ) -> QueryResult<Vec<Task>> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            WHERE status = $1
            ORDER BY creation_date ASC, id ASC
            "#,
        )
        .bind(status)
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn search_tasks_by_priority(
        &self,
        ctx: &QueryContext,
        priority: TaskPriority,
    ) -> QueryResult<Vec<Task>> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            WHERE priority = $1
            ORDER BY creation_date ASC, id ASC
            "#,
        )
        .bind(priority)
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn search_tasks_by_assignee(
        &self,
        ctx: &QueryContext,
        assignee_id: i64,
    ) -> QueryResult<Vec<Task>> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            WHERE assignee_id = $1
            ORDER BY creation_date ASC, id ASC
            "#,
        )
        .bind(assignee_id)
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn search_tasks_by_project(
        &self,
        ctx: &QueryContext,
        project_id: i64,
    ) -> QueryResult<Vec<Task>> {
        let query = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, status, assignee_id, project_id,
                   creation_date, completion_date
            FROM tasks
            WHERE project_id = $1
            ORDER BY creation_date ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool());

        ctx.run(query).await
    }
}
