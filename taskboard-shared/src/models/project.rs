/// Project model and queries
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id BIGSERIAL PRIMARY KEY,
///     name TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     start_date DATE NOT NULL,
///     end_date DATE NOT NULL,
///     manager_id BIGINT NOT NULL
/// );
/// ```
///
/// `end_date >= start_date` is expected but left to callers. Listings and
/// searches come back in insertion order (`id`).

use crate::db::context::QueryContext;
use crate::db::queries::Queries;
use crate::error::{QueryError, QueryResult};
use crate::models::contains_pattern;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A project as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Store-assigned id
    pub id: i64,

    pub name: String,

    pub description: String,

    /// First day of the project
    pub start_date: NaiveDate,

    /// Last day of the project
    pub end_date: NaiveDate,

    /// Id of the managing user (not enforced)
    pub manager_id: i64,
}

/// Input for [`ProjectQueries::create_project`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectParams {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub manager_id: i64,
}

/// Input for [`ProjectQueries::update_project`]; overwrites every field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectParams {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub manager_id: i64,
}

/// Project queries
#[async_trait]
pub trait ProjectQueries: Send + Sync {
    async fn create_project(
        &self,
        ctx: &QueryContext,
        params: CreateProjectParams,
    ) -> QueryResult<Project>;

    async fn get_project(&self, ctx: &QueryContext, id: i64) -> QueryResult<Project>;

    async fn list_projects(&self, ctx: &QueryContext) -> QueryResult<Vec<Project>>;

    async fn update_project(
        &self,
        ctx: &QueryContext,
        params: UpdateProjectParams,
    ) -> QueryResult<Project>;

    async fn delete_project(&self, ctx: &QueryContext, id: i64) -> QueryResult<()>;

    /// Projects whose name contains `name`, ignoring case
    async fn search_projects_by_name(
        &self,
        ctx: &QueryContext,
        name: &str,
    ) -> QueryResult<Vec<Project>>;

    /// Projects managed by `manager_id`
    async fn search_projects_by_manager(
        &self,
        ctx: &QueryContext,
        manager_id: i64,
    ) -> QueryResult<Vec<Project>>;
}

#[async_trait]
impl ProjectQueries for Queries {
    async fn create_project(
        &self,
        ctx: &QueryContext,
        params: CreateProjectParams,
    ) -> QueryResult<Project> {
        let query = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, start_date, end_date, manager_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, start_date, end_date, manager_id
            "#,
        )
        .bind(params.name)
        .bind(params.description)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(params.manager_id)
        .fetch_one(self.pool());

        ctx.run(query).await
    }

    async fn get_project(&self, ctx: &QueryContext, id: i64) -> QueryResult<Project> {
        let query = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, manager_id
            FROM projects
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool());

        ctx.run(query)
            .await?
            .ok_or_else(|| QueryError::not_found("project", id))
    }

    async fn list_projects(&self, ctx: &QueryContext) -> QueryResult<Vec<Project>> {
        let query = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, manager_id
            FROM projects
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn update_project(
        &self,
        ctx: &QueryContext,
        params: UpdateProjectParams,
    ) -> QueryResult<Project> {
        let id = params.id;
        let query = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2, description = $3, start_date = $4, end_date = $5, manager_id = $6
            WHERE id = $1
            RETURNING id, name, description, start_date, end_date, manager_id
            "#,
        )
        .bind(id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(params.manager_id)
        .fetch_optional(self.pool());

        ctx.run(query)
            .await?
            .ok_or_else(|| QueryError::not_found("project", id))
    }

    async fn delete_project(&self, ctx: &QueryContext, id: i64) -> QueryResult<()> {
        let query = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool());

        let result = ctx.run(query).await?;
        if result.rows_affected() == 0 {
            return Err(QueryError::not_found("project", id));
        }

        Ok(())
    }

    async fn search_projects_by_name(
        &self,
        ctx: &QueryContext,
        name: &str,
    ) -> QueryResult<Vec<Project>> {
        let query = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, manager_id
            FROM projects
            WHERE name ILIKE $1 ESCAPE '\'
            ORDER BY id ASC
            "#,
        )
        .bind(contains_pattern(name))
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn search_projects_by_manager(
        &self,
        ctx: &QueryContext,
        manager_id: i64,
    ) -> QueryResult<Vec<Project>> {
        let query = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, manager_id
            FROM projects
            WHERE manager_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(manager_id)
        .fetch_all(self.pool());

        ctx.run(query).await
    }
}
