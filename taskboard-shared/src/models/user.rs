/// User model and queries
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'admin');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     full_name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     registration_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     role user_role NOT NULL DEFAULT 'user'
/// );
/// ```
///
/// Listings and searches are ordered by `full_name`, then `id`.

use crate::db::context::QueryContext;
use crate::db::queries::Queries;
use crate::error::{QueryError, QueryResult};
use crate::models::{contains_pattern, ParseEnumError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role of a user
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular member
    #[default]
    User,

    /// Administrator
    Admin,
}

impl UserRole {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(ParseEnumError {
                kind: "user role",
                value: other.to_string(),
                expected: "user, admin",
            }),
        }
    }
}

/// A user as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned id
    pub id: i64,

    /// Display name
    pub full_name: String,

    /// Email address (unique)
    pub email: String,

    /// Set by the store on insert
    pub registration_date: DateTime<Utc>,

    /// Access role
    pub role: UserRole,
}

/// Input for [`UserQueries::create_user`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserParams {
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

/// Input for [`UserQueries::update_user`]
///
/// Every field overwrites the stored value; `registration_date` is immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserParams {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

/// User queries
#[async_trait]
pub trait UserQueries: Send + Sync {
    /// Inserts a user and returns it with its id and registration date
    async fn create_user(&self, ctx: &QueryContext, params: CreateUserParams) -> QueryResult<User>;

    /// Fetches one user; `NotFound` if the id is unknown
    async fn get_user(&self, ctx: &QueryContext, id: i64) -> QueryResult<User>;

    /// All users by name
    async fn list_users(&self, ctx: &QueryContext) -> QueryResult<Vec<User>>;

    /// Overwrites a user; `NotFound` if the id is unknown
    async fn update_user(&self, ctx: &QueryContext, params: UpdateUserParams) -> QueryResult<User>;

    /// Removes a user; `NotFound` if nothing was deleted
    async fn delete_user(&self, ctx: &QueryContext, id: i64) -> QueryResult<()>;

    /// Users whose name contains `name`, ignoring case
    async fn search_users_by_name(&self, ctx: &QueryContext, name: &str) -> QueryResult<Vec<User>>;

    /// Users whose email contains `email`, ignoring case
    async fn search_users_by_email(&self, ctx: &QueryContext, email: &str) -> QueryResult<Vec<User>>;
}

#[async_trait]
impl UserQueries for Queries {
    async fn create_user(&self, ctx: &QueryContext, params: CreateUserParams) -> QueryResult<User> {
        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, email, registration_date, role
            "#,
        )
        .bind(params.full_name)
        .bind(params.email)
        .bind(params.role)
        .fetch_one(self.pool());

        ctx.run(query).await
    }

    async fn get_user(&self, ctx: &QueryContext, id: i64) -> QueryResult<User> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, registration_date, role
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool());

        ctx.run(query)
            .await?
            .ok_or_else(|| QueryError::not_found("user", id))
    }

    async fn list_users(&self, ctx: &QueryContext) -> QueryResult<Vec<User>> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, registration_date, role
            FROM users
            ORDER BY full_name ASC, id ASC
            "#,
        )
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn update_user(&self, ctx: &QueryContext, params: UpdateUserParams) -> QueryResult<User> {
        let id = params.id;
        let query = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, role = $4
            WHERE id = $1
            RETURNING id, full_name, email, registration_date, role
            "#,
        )
        .bind(id)
        .bind(params.full_name)
        .bind(params.email)
        .bind(params.role)
        .fetch_optional(self.pool());

        ctx.run(query)
            .await?
            .ok_or_else(|| QueryError::not_found("user", id))
    }

    async fn delete_user(&self, ctx: &QueryContext, id: i64) -> QueryResult<()> {
        let query = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool());

        let result = ctx.run(query).await?;
        if result.rows_affected() == 0 {
            return Err(QueryError::not_found("user", id));
        }

        Ok(())
    }

    async fn search_users_by_name(&self, ctx: &QueryContext, name: &str) -> QueryResult<Vec<User>> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, registration_date, role
            FROM users
            WHERE full_name ILIKE $1 ESCAPE '\'
            ORDER BY full_name ASC, id ASC
            "#,
        )
        .bind(contains_pattern(name))
        .fetch_all(self.pool());

        ctx.run(query).await
    }

    async fn search_users_by_email(&self, ctx: &QueryContext, email: &str) -> QueryResult<Vec<User>> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, registration_date, role
            FROM users
            WHERE email ILIKE $1 ESCAPE '\'
            ORDER BY full_name ASC, id ASC
            "#,
        )
        .bind(contains_pattern(email))
        .fetch_all(self.pool());

        ctx.run(query).await
    }
}
