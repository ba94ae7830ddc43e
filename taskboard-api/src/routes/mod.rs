/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: User CRUD, search and assigned tasks
/// - `projects`: Project CRUD, search and project tasks
/// - `tasks`: Task CRUD and search

pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;
