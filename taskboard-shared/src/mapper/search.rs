/// Search criteria from query strings
///
/// Each search endpoint takes several optional parameters but runs exactly one
/// query. The first non-empty parameter, in declaration order, decides which.
/// Text criteria are substring matches; the rest are exact.

use crate::mapper::{parse_enum, parse_id, MapError};
use crate::models::task::{TaskPriority, TaskStatus};
use serde::Deserialize;

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `GET /users/search?name=…|email=…`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearchQuery {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserSearch {
    Name(String),
    Email(String),
}

impl UserSearchQuery {
    pub fn into_criterion(self) -> Result<UserSearch, MapError> {
        if let Some(name) = present(self.name) {
            return Ok(UserSearch::Name(name));
        }
        if let Some(email) = present(self.email) {
            return Ok(UserSearch::Email(email));
        }

        Err(MapError::MissingCriterion {
            expected: "name, email",
        })
    }
}

/// `GET /projects/search?name=…|manager_id=…`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSearchQuery {
    pub name: Option<String>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSearch {
    Name(String),
    Manager(i64),
}

impl ProjectSearchQuery {
    pub fn into_criterion(self) -> Result<ProjectSearch, MapError> {
        if let Some(name) = present(self.name) {
            return Ok(ProjectSearch::Name(name));
        }
        if let Some(manager_id) = present(self.manager_id) {
            return Ok(ProjectSearch::Manager(parse_id("manager_id", &manager_id)?));
        }

        Err(MapError::MissingCriterion {
            expected: "name, manager_id",
        })
    }
}

/// `GET /tasks/search?title=…|status=…|priority=…|assignee_id=…|project_id=…`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSearchQuery {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSearch {
    Title(String),
    Status(TaskStatus),
    Priority(TaskPriority),
    Assignee(i64),
    Project(i64),
}

impl TaskSearchQuery {
    pub fn into_criterion(self) -> Result<TaskSearch, MapError> {
        if let Some(title) = present(self.title) {
            return Ok(TaskSearch::Title(title));
        }
        if let Some(status) = present(self.status) {
            return Ok(TaskSearch::Status(parse_enum("status", &status)?));
        }
        if let Some(priority) = present(self.priority) {
            return Ok(TaskSearch::Priority(parse_enum("priority", &priority)?));
        }
        if let Some(assignee_id) = present(self.assignee_id) {
            return Ok(TaskSearch::Assignee(parse_id("assignee_id", &assignee_id)?));
        }
        if let Some(project_id) = present(self.project_id) {
            return Ok(TaskSearch::Project(parse_id("project_id", &project_id)?));
        }

        Err(MapError::MissingCriterion {
            expected: "title, status, priority, assignee_id, project_id",
        })
    }
}
