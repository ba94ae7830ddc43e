/// Entity models and their queries
///
/// Each module defines one entity record, its create/update parameter
/// structs, its query trait, and the PostgreSQL implementation of that trait
/// on [`crate::db::queries::Queries`].
///
/// - `user`: people who manage projects and get tasks assigned
/// - `project`: a dated piece of work with a manager
/// - `task`: a unit of work inside a project, assigned to a user
///
/// References between entities (`manager_id`, `assignee_id`, `project_id`) are
/// plain ids. They are not enforced by the schema and deletes never cascade.

pub mod project;
pub mod task;
pub mod user;

use thiserror::Error;

/// Raised when a string is not one of an enum's stored representations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} {value:?}, expected one of: {expected}")]
pub struct ParseEnumError {
    /// Enum being parsed (e.g. "task status")
    pub kind: &'static str,

    /// Rejected input
    pub value: String,

    /// Accepted values, comma separated
    pub expected: &'static str,
}

/// Builds an `ILIKE` pattern matching `needle` anywhere in the column
///
/// `%`, `_` and the escape character are matched literally. Queries using the
/// result must declare `ESCAPE '\'`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
