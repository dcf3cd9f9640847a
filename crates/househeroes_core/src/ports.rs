//! crates/househeroes_core/src/ports.rs
//!
//! The storage contract for families, users, tasks and assignments. The API
//! runs against PostgreSQL or the in-memory store through this one trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, Family, Task, TaskAssignment, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Store failures, independent of the backing engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<DomainError> for PortError {
    fn from(err: DomainError) -> Self {
        PortError::Validation(err.to_string())
    }
}

pub type PortResult<T> = Result<T, PortError>;

/// Rows written together by `insert_dataset`, in dependency order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub families: Vec<Family>,
    pub users: Vec<User>,
    pub tasks: Vec<Task>,
    pub assignments: Vec<TaskAssignment>,
}

//=========================================================================================
// Persistence Port
//=========================================================================================

/// Persistence gateway for the family/user/task model.
///
/// Implementations enforce the relational constraints: unique external ids
/// and emails, unique (task, user) assignment pairs, foreign keys, and cascading deletes
/// from tasks to their assignments.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Families ---
    async fn insert_family(&self, family: Family) -> PortResult<Family>;

    async fn get_family_by_id(&self, family_id: Uuid) -> PortResult<Family>;

    async fn list_families(&self) -> PortResult<Vec<Family>>;

    async fn has_any_family(&self) -> PortResult<bool>;

    // --- Users ---

    /// Fails with `Conflict` when the external id or email is taken and `NotFound`
    /// when the referenced family does not exist.
    async fn insert_user(&self, user: User) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn list_users_by_family(&self, family_id: Uuid) -> PortResult<Vec<User>>;

    /// Returns `false` when no user has the given external id.
    async fn update_last_login(&self, external_id: &str, at: DateTime<Utc>) -> PortResult<bool>;

    // --- Tasks ---
    async fn insert_task(&self, task: Task) -> PortResult<Task>;

    async fn get_task_by_id(&self, task_id: Uuid) -> PortResult<Task>;

    async fn list_tasks(&self) -> PortResult<Vec<Task>>;

    async fn list_tasks_by_family(&self, family_id: Uuid) -> PortResult<Vec<Task>>;

    async fn list_tasks_created_by(&self, user_id: Uuid) -> PortResult<Vec<Task>>;

    /// Sets `is_completed` and stamps `completed_at`, even when already done.
    async fn complete_task(&self, task_id: Uuid, at: DateTime<Utc>) -> PortResult<Task>;

    /// Deletes the task and its assignments. Returns `false` when absent.
    async fn delete_task(&self, task_id: Uuid) -> PortResult<bool>;

    // --- Assignments ---
    async fn insert_assignment(&self, assignment: TaskAssignment) -> PortResult<TaskAssignment>;

    async fn list_assignments(&self) -> PortResult<Vec<TaskAssignment>>;

    async fn list_assignments_for_task(&self, task_id: Uuid) -> PortResult<Vec<TaskAssignment>>;

    async fn list_assignments_for_user(&self, user_id: Uuid) -> PortResult<Vec<TaskAssignment>>;

    // --- Registration ---

    /// Inserts an optional new family and the user atomically.
    async fn insert_registration(&self, family: Option<Family>, user: User) -> PortResult<User>;

    // --- Bulk ---

    /// Writes every row of the dataset or none of them.
    async fn insert_dataset(&self, dataset: Dataset) -> PortResult<()>;
}
