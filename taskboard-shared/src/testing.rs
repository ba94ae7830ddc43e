/// In-memory querier for tests
///
/// Mirrors the PostgreSQL implementation closely enough for handler tests:
/// per-table sequential ids, store-assigned timestamps, unique emails, the same
/// orderings, case-insensitive substring search and `NotFound` on unknown ids.
/// Every call goes through [`QueryContext::run`], so cancellation and
/// deadlines behave as they do against a real pool.
///
/// [`InMemoryQuerier::set_unavailable`] makes every call fail with a store
/// error and [`InMemoryQuerier::set_latency`] delays every call.

use crate::db::context::QueryContext;
use crate::db::queries::Querier;
use crate::error::{QueryError, QueryResult};
use crate::models::project::{CreateProjectParams, Project, ProjectQueries, UpdateProjectParams};
use crate::models::task::{
    CreateTaskParams, Task, TaskPriority, TaskQueries, TaskStatus, UpdateTaskParams,
};
use crate::models::user::{CreateUserParams, UpdateUserParams, User, UserQueries};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Per-table id counter, like a `BIGSERIAL` sequence
#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next_id(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct Store {
    user_ids: Sequence,
    project_ids: Sequence,
    task_ids: Sequence,
    users: BTreeMap<i64, User>,
    projects: BTreeMap<i64, Project>,
    tasks: BTreeMap<i64, Task>,
}

impl Store {

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Thread-safe in-memory implementation of [`Querier`]
#[derive(Debug, Default)]
pub struct InMemoryQuerier {
    store: Mutex<Store>,
    unavailable: AtomicBool,
    latency: Mutex<Duration>,
}

impl InMemoryQuerier {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with [`QueryError::Store`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay applied before every call
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn exec<T, F>(&self, ctx: &QueryContext, op: F) -> QueryResult<T>
    where
        F: FnOnce(&mut Store) -> QueryResult<T> + Send,
        T: Send,
    {
        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());

        ctx.run(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(QueryError::Store(sqlx::Error::PoolTimedOut));
            }
            op(&mut self.lock())
        })
        .await
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn users_sorted(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
    users
}

fn projects_sorted(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by_key(|p| p.id);
    projects
}

fn tasks_sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        a.creation_date
            .cmp(&b.creation_date)
            .then(a.id.cmp(&b.id))
    });
    tasks
}

fn duplicate_email(email: &str) -> QueryError {
    QueryError::Store(sqlx::Error::Protocol(format!(
        "duplicate key value violates unique constraint \"users_email_key\" ({email})"
    )))
}

fn filter_tasks(store: &Store, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
    tasks_sorted(store.tasks.values().filter(|&t| keep(t)).cloned().collect())
}

#[async_trait]
impl UserQueries for InMemoryQuerier {
    async fn create_user(&self, ctx: &QueryContext, params: CreateUserParams) -> QueryResult<User> {
        self.exec(ctx, move |store| {
            if store.email_taken(&params.email, None) {
                return Err(duplicate_email(&params.email));
            }
            let user = User {
                id: store.user_ids.next_id(),
                full_name: params.full_name,
                email: params.email,
                registration_date: Utc::now(),
                role: params.role,
            };
            store.users.insert(user.id, user.clone());
            Ok(user)
        })
        .await
    }

    async fn get_user(&self, ctx: &QueryContext, id: i64) -> QueryResult<User> {
        self.exec(ctx, move |store| {
            store
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| QueryError::not_found("user", id))
        })
        .await
    }

    async fn list_users(&self, ctx: &QueryContext) -> QueryResult<Vec<User>> {
        self.exec(ctx, |store| Ok(users_sorted(store.users.values().cloned().collect())))
            .await
    }

    async fn update_user(&self, ctx: &QueryContext, params: UpdateUserParams) -> QueryResult<User> {
        self.exec(ctx, move |store| {
            if !store.users.contains_key(&params.id) {
                return Err(QueryError::not_found("user", params.id));
            }
            if store.email_taken(&params.email, Some(params.id)) {
                return Err(duplicate_email(&params.email));
            }
            let user = store
                .users
                .get_mut(&params.id)
                .ok_or_else(|| QueryError::not_found("user", params.id))?;
            user.full_name = params.full_name;
            user.email = params.email;
            user.role = params.role;
            Ok(user.clone())
        })
        .await
    }

    async fn delete_user(&self, ctx: &QueryContext, id: i64) -> QueryResult<()> {
        self.exec(ctx, move |store| {
            store
                .users
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| QueryError::not_found("user", id))
        })
        .await
    }

    async fn search_users_by_name(&self, ctx: &QueryContext, name: &str) -> QueryResult<Vec<User>> {
        self.exec(ctx, |store| {
            Ok(users_sorted(
                store
                    .users
                    .values()
                    .filter(|u| contains(&u.full_name, name))
                    .cloned()
                    .collect(),
            ))
        })
        .await
    }

    async fn search_users_by_email(&self, ctx: &QueryContext, email: &str) -> QueryResult<Vec<User>> {
        self.exec(ctx, |store| {
            Ok(users_sorted(
                store
                    .users
                    .values()
                    .filter(|u| contains(&u.email, email))
                    .cloned()
                    .collect(),
            ))
        })
        .await
    }
}

#[async_trait]
impl ProjectQueries for InMemoryQuerier {
    async fn create_project(
        &self,
        ctx: &QueryContext,
        params: CreateProjectParams,
    ) -> QueryResult<Project> {
        self.exec(ctx, move |store| {
            let project = Project {
                id: store.project_ids.next_id(),
                name: params.name,
                description: params.description,
                start_date: params.start_date,
                end_date: params.end_date,
                manager_id: params.manager_id,
            };
            store.projects.insert(project.id, project.clone());
            Ok(project)
        })
        .await
    }

    async fn get_project(&self, ctx: &QueryContext, id: i64) -> QueryResult<Project> {
        self.exec(ctx, move |store| {
            store
                .projects
                .get(&id)
                .cloned()
                .ok_or_else(|| QueryError::not_found("project", id))
        })
        .await
    }

    async fn list_projects(&self, ctx: &QueryContext) -> QueryResult<Vec<Project>> {
        self.exec(ctx, |store| {
            Ok(projects_sorted(store.projects.values().cloned().collect()))
        })
        .await
    }

    async fn update_project(
        &self,
        ctx: &QueryContext,
        params: UpdateProjectParams,
    ) -> QueryResult<Project> {
        self.exec(ctx, move |store| {
            let project = store
                .projects
                .get_mut(&params.id)
                .ok_or_else(|| QueryError::not_found("project", params.id))?;
            project.name = params.name;
            project.description = params.description;
            project.start_date = params.start_date;
            project.end_date = params.end_date;
            project.manager_id = params.manager_id;
            Ok(project.clone())
        })
        .await
    }

    async fn delete_project(&self, ctx: &QueryContext, id: i64) -> QueryResult<()> {
        self.exec(ctx, move |store| {
            store
                .projects
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| QueryError::not_found("project", id))
        })
        .await
    }

    async fn search_projects_by_name(
        &self,
        ctx: &QueryContext,
        name: &str,
    ) -> QueryResult<Vec<Project>> {
        self.exec(ctx, |store| {
            Ok(projects_sorted(
                store
                    .projects
                    .values()
                    .filter(|p| contains(&p.name, name))
                    .cloned()
                    .collect(),
            ))
        })
        .await
    }

    async fn search_projects_by_manager(
        &self,
        ctx: &QueryContext,
        manager_id: i64,
    ) -> QueryResult<Vec<Project>> {
        self.exec(ctx, move |store| {
            Ok(projects_sorted(
                store
                    .projects
                    .values()
                    .filter(|p| p.manager_id == manager_id)
                    .cloned()
                    .collect(),
            ))
        })
        .await
    }
}

#[async_trait]
impl TaskQueries for InMemoryQuerier {
    async fn create_task(&self, ctx: &QueryContext, params: CreateTaskParams) -> QueryResult<Task> {
        self.exec(ctx, move |store| {
            let task = Task {
                id: store.task_ids.next_id(),
                title: params.title,
                description: params.description,
                priority: params.priority,
                status: params.status,
                assignee_id: params.assignee_id,
                project_id: params.project_id,
                creation_date: Utc::now(),
                completion_date: params.completion_date,
            };
            store.tasks.insert(task.id, task.clone());
            Ok(task)
        })
        .await
    }

    async fn get_task(&self, ctx: &QueryContext, id: i64) -> QueryResult<Task> {
        self.exec(ctx, move |store| {
            store
                .tasks
                .get(&id)
                .cloned()
                .ok_or_else(|| QueryError::not_found("task", id))
        })
        .await
    }

    async fn list_tasks(&self, ctx: &QueryContext) -> QueryResult<Vec<Task>> {
        self.exec(ctx, |store| Ok(filter_tasks(store, |_| true))).await
    }

    async fn update_task(&self, ctx: &QueryContext, params: UpdateTaskParams) -> QueryResult<Task> {
        self.exec(ctx, move |store| {
            let task = store
                .tasks
                .get_mut(&params.id)
                .ok_or_else(|| QueryError::not_found("task", params.id))?;
            task.title = params.title;
            task.description = params.description;
            task.priority = params.priority;
            task.status = params.status;
            task.assignee_id = params.assignee_id;
            task.project_id = params.project_id;
            task.completion_date = params.completion_date;
            Ok(task.clone())
        })
        .await
    }

    async fn delete_task(&self, ctx: &QueryContext, id: i64) -> QueryResult<()> {
        self.exec(ctx, move |store| {
            store
                .tasks
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| QueryError::not_found("task", id))
        })
        .await
    }

    async fn search_tasks_by_title(&self, ctx: &QueryContext, title: &str) -> QueryResult<Vec<Task>> {
        self.exec(ctx, |store| Ok(filter_tasks(store, |t| contains(&t.title, title))))
            .await
    }

    async fn search_tasks_by_status(
        &self,
        ctx: &QueryContext,
        status: TaskStatus,
    ) -> QueryResult<Vec<Task>> {
        self.exec(ctx, move |store| Ok(filter_tasks(store, |t| t.status == status)))
            .await
    }

    async fn search_tasks_by_priority(
        &self,
        ctx: &QueryContext,
        priority: TaskPriority,
    ) -> QueryResult<Vec<Task>> {
        self.exec(ctx, move |store| Ok(filter_tasks(store, |t| t.priority == priority)))
            .await
    }

    async fn search_tasks_by_assignee(
        &self,
        ctx: &QueryContext,
        assignee_id: i64,
    ) -> QueryResult<Vec<Task>> {
        self.exec(ctx, move |store| {
            Ok(filter_tasks(store, |t| t.assignee_id == assignee_id))
        })
        .await
    }

    async fn search_tasks_by_project(
        &self,
        ctx: &QueryContext,
        project_id: i64,
    ) -> QueryResult<Vec<Task>> {
        self.exec(ctx, move |store| {
            Ok(filter_tasks(store, |t| t.project_id == project_id))
        })
        .await
    }
}

#[async_trait]
impl Querier for InMemoryQuerier {
    async fn ping(&self, ctx: &QueryContext) -> QueryResult<()> {
        self.exec(ctx, |_| Ok(())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::NaiveDate;

    fn user(name: &str, email: &str) -> CreateUserParams {
        CreateUserParams {
            full_name: name.to_string(),
            email: email.to_string(),
            role: UserRole::User,
        }
    }

    fn task(title: &str, assignee_id: i64, project_id: i64) -> CreateTaskParams {
        CreateTaskParams {
            title: title.to_string(),
            description: String::new(),
            priority: TaskPriority::Low,
            status: TaskStatus::New,
            assignee_id,
            project_id,
            completion_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_user() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        let created = q.create_user(&ctx, user("Alice", "alice@example.com")).await.unwrap();
        let fetched = q.get_user(&ctx, created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_users_listed_by_name_then_id() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        q.create_user(&ctx, user("Bob", "bob@example.com")).await.unwrap();
        q.create_user(&ctx, user("Alice", "alice2@example.com")).await.unwrap();
        q.create_user(&ctx, user("Alice", "alice1@example.com")).await.unwrap();

        let users = q.list_users(&ctx).await.unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(
            emails,
            vec!["alice2@example.com", "alice1@example.com", "bob@example.com"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_store_error() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        q.create_user(&ctx, user("Alice", "alice@example.com")).await.unwrap();
        let err = q
            .create_user(&ctx, user("Other", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Store(_)));
    }

    #[tokio::test]
    async fn test_name_search_ignores_case() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        q.create_user(&ctx, user("Alice Smith", "a@example.com")).await.unwrap();
        q.create_user(&ctx, user("Bob", "b@example.com")).await.unwrap();

        let found = q.search_users_by_name(&ctx, "SMITH").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "Alice Smith");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        assert!(q.get_project(&ctx, 9).await.unwrap_err().is_not_found());
        assert!(q.delete_task(&ctx, 9).await.unwrap_err().is_not_found());
        let err = q
            .update_user(
                &ctx,
                UpdateUserParams {
                    id: 9,
                    full_name: "Nobody".to_string(),
                    email: "nobody@example.com".to_string(),
                    role: UserRole::Admin,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_projects_listed_in_insertion_order() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();

        for (name, start) in [("late", 20), ("early", 1)] {
            q.create_project(
                &ctx,
                CreateProjectParams {
                    name: name.to_string(),
                    description: String::new(),
                    start_date: day(start),
                    end_date: day(28),
                    manager_id: 1,
                },
            )
            .await
            .unwrap();
        }

        let names: Vec<String> = q
            .list_projects(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["late", "early"]);
    }

    #[tokio::test]
    async fn test_ids_are_sequenced_per_table() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let alice = q.create_user(&ctx, user("Alice", "alice@example.com")).await.unwrap();
        let bob = q.create_user(&ctx, user("Bob", "bob@example.com")).await.unwrap();
        let project = q
            .create_project(
                &ctx,
                CreateProjectParams {
                    name: "Launch".to_string(),
                    description: String::new(),
                    start_date: day,
                    end_date: day,
                    manager_id: alice.id,
                },
            )
            .await
            .unwrap();
        let first = q.create_task(&ctx, task("First", bob.id, project.id)).await.unwrap();

        assert_eq!((alice.id, bob.id), (1, 2));
        assert_eq!(project.id, 1);
        assert_eq!(first.id, 1);
    }

    #[tokio::test]
    async fn test_task_filters() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        q.create_task(&ctx, task("Write docs", 1, 10)).await.unwrap();
        q.create_task(&ctx, task("Fix bug", 2, 10)).await.unwrap();
        q.create_task(&ctx, task("Write tests", 1, 20)).await.unwrap();

        assert_eq!(q.search_tasks_by_assignee(&ctx, 1).await.unwrap().len(), 2);
        assert_eq!(q.search_tasks_by_project(&ctx, 10).await.unwrap().len(), 2);
        assert_eq!(q.search_tasks_by_title(&ctx, "write").await.unwrap().len(), 2);
        assert_eq!(
            q.search_tasks_by_status(&ctx, TaskStatus::Done).await.unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn test_deleted_task_is_gone() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        let created = q.create_task(&ctx, task("Temp", 1, 1)).await.unwrap();
        q.delete_task(&ctx, created.id).await.unwrap();

        assert!(q.get_task(&ctx, created.id).await.unwrap_err().is_not_found());
        assert!(q.delete_task(&ctx, created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let q = InMemoryQuerier::new();
        let ctx = QueryContext::background();

        q.set_unavailable(true);
        assert!(matches!(q.ping(&ctx).await, Err(QueryError::Store(_))));

        q.set_unavailable(false);
        assert!(q.ping(&ctx).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_hits_deadline() {
        let q = InMemoryQuerier::new();
        q.set_latency(Duration::from_secs(5));

        let ctx = QueryContext::with_timeout(Duration::from_secs(1));
        assert!(matches!(q.list_users(&ctx).await, Err(QueryError::Timeout)));
    }
}
