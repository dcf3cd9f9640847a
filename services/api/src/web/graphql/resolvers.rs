//! services/api/src/web/graphql/resolvers.rs
//!
//! The operations behind every root field, as plain async functions. Handlers
//! that depend on who is calling take the `AuthContext` explicitly.

use househeroes_core::claims::AuthContext;
use househeroes_core::domain::{Family, NewTask, NewUser, Task, TaskAssignment, User};
use househeroes_core::ports::{PortError, PortResult};
use househeroes_core::query::{
    apply_family_sort, apply_task_query, apply_user_query, FamilySortField, Sort, TaskFilter,
    TaskSortField, UserFilter, UserSortField,
};
use househeroes_core::registration::{RegisterNewUserRequest, RegistrationOutcome};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use super::ApiServices;

/// Turns a `NotFound` into `None`.
pub fn found<T>(result: PortResult<T>) -> PortResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn assigned_task_ids(
    services: &ApiServices,
    filter: &TaskFilter,
) -> PortResult<Option<HashSet<Uuid>>> {
    let Some(user_id) = filter.assigned_to_id else {
        return Ok(None);
    };
    let assignments = services.db.list_assignments_for_user(user_id).await?;
    Ok(Some(assignments.into_iter().map(|a| a.task_id).collect()))
}

//=========================================================================================
// Open Queries
//=========================================================================================

pub async fn families(
    services: &ApiServices,
    sort: Option<Sort<FamilySortField>>,
) -> PortResult<Vec<Family>> {
    let families = services.db.list_families().await?;
    Ok(apply_family_sort(families, sort.as_ref()))
}

pub async fn family(services: &ApiServices, id: Uuid) -> PortResult<Option<Family>> {
    found(services.db.get_family_by_id(id).await)
}

pub async fn users(
    services: &ApiServices,
    filter: UserFilter,
    sort: Option<Sort<UserSortField>>,
) -> PortResult<Vec<User>> {
    let users = match filter.family_id {
        Some(family_id) => services.db.list_users_by_family(family_id).await?,
        None => services.db.list_users().await?,
    };
    Ok(apply_user_query(users, &filter, sort.as_ref()))
}

pub async fn user(services: &ApiServices, id: Uuid) -> PortResult<Option<User>> {
    found(services.db.get_user_by_id(id).await)
}

pub async fn tasks(
    services: &ApiServices,
    filter: TaskFilter,
    sort: Option<Sort<TaskSortField>>,
) -> PortResult<Vec<Task>> {
    let tasks = match filter.family_id {
        Some(family_id) => services.db.list_tasks_by_family(family_id).await?,
        None => services.db.list_tasks().await?,
    };
    let assigned = assigned_task_ids(services, &filter).await?;
    Ok(apply_task_query(tasks, &filter, sort.as_ref(), assigned.as_ref()))
}

pub async fn task_assignments(services: &ApiServices) -> PortResult<Vec<TaskAssignment>> {
    services.db.list_assignments().await
}

//=========================================================================================
// Caller-Scoped Queries
//=========================================================================================

pub async fn my_family(services: &ApiServices, auth: &AuthContext) -> PortResult<Option<Family>> {
    match services.identity.current_family_id(auth).await? {
        Some(family_id) => found(services.db.get_family_by_id(family_id).await),
        None => Ok(None),
    }
}

/// The caller's family tasks. Any `family_id` in the filter is overridden.
pub async fn my_tasks(
    services: &ApiServices,
    auth: &AuthContext,
    filter: TaskFilter,
    sort: Option<Sort<TaskSortField>>,
) -> PortResult<Vec<Task>> {
    let Some(family_id) = services.identity.current_family_id(auth).await? else {
        return Ok(Vec::new());
    };
    let filter = TaskFilter { family_id: Some(family_id), ..filter };
    tasks(services, filter, sort).await
}

pub async fn family_members(services: &ApiServices, auth: &AuthContext) -> PortResult<Vec<User>> {
    match services.identity.current_family_id(auth).await? {
        Some(family_id) => services.db.list_users_by_family(family_id).await,
        None => Ok(Vec::new()),
    }
}

pub async fn current_user(services: &ApiServices, auth: &AuthContext) -> PortResult<Option<User>> {
    services.identity.get_current_user(auth).await
}

/// `None` unless the task exists and belongs to the caller's family.
pub async fn task_by_id(
    services: &ApiServices,
    auth: &AuthContext,
    task_id: Uuid,
) -> PortResult<Option<Task>> {
    let Some(family_id) = services.identity.current_family_id(auth).await? else {
        return Ok(None);
    };
    let task = found(services.db.get_task_by_id(task_id).await)?;
    Ok(task.filter(|t| t.family_id == family_id))
}

//=========================================================================================
// Mutations
//=========================================================================================

pub async fn create_family(services: &ApiServices, name: &str) -> PortResult<Family> {
    let family = Family::new(name, services.clock.utc())?;
    let family = services.db.insert_family(family).await?;
    info!("Created family {}", family.id);
    Ok(family)
}

pub async fn create_user(services: &ApiServices, new_user: NewUser) -> PortResult<User> {
    let user = User::new(new_user, services.clock.utc())?;
    let user = services.db.insert_user(user).await?;
    info!("Created user {}", user.id);
    Ok(user)
}

pub async fn create_task(services: &ApiServices, new_task: NewTask) -> PortResult<Task> {
    let task = Task::new(new_task, services.clock.utc())?;
    let task = services.db.insert_task(task).await?;
    info!("Created task {} in family {}", task.id, task.family_id);
    Ok(task)
}

pub async fn assign_task(
    services: &ApiServices,
    assignment: TaskAssignment,
) -> PortResult<TaskAssignment> {
    let assignment = services.db.insert_assignment(assignment).await?;
    info!("Assigned task {} to user {}", assignment.task_id, assignment.user_id);
    Ok(assignment)
}

pub async fn complete_task(services: &ApiServices, task_id: Uuid) -> PortResult<Task> {
    let task = services.db.complete_task(task_id, services.clock.utc()).await?;
    info!("Completed task {}", task.id);
    Ok(task)
}

pub async fn delete_task(services: &ApiServices, task_id: Uuid) -> PortResult<bool> {
    let deleted = services.db.delete_task(task_id).await?;
    if deleted {
        info!("Deleted task {}", task_id);
    }
    Ok(deleted)
}

pub async fn register_new_user(
    services: &ApiServices,
    auth: &AuthContext,
    request: RegisterNewUserRequest,
) -> PortResult<RegistrationOutcome> {
    services.registration.register_new_user(auth, request).await
}
