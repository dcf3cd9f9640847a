//! services/api/src/web/graphql/types.rs
//!
//! Output types. Each wraps a domain entity and resolves its relationships
//! by id lookups against the database port.

use async_graphql::{Context, Object, Result as GqlResult, SimpleObject};
use chrono::{DateTime, Utc};
use househeroes_core::domain::{Family, Task, TaskAssignment, User};
use househeroes_core::registration::RegistrationOutcome;
use uuid::Uuid;

use super::errors::IntoGraphQl;
use super::inputs::UserRoleValue;
use super::resolvers::found;
use super::ApiServices;

pub struct FamilyType(pub Family);

#[Object(name = "Family")]
impl FamilyType {
    async fn id(&self) -> Uuid {
        self.0.id
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn members(&self, ctx: &Context<'_>) -> GqlResult<Vec<UserType>> {
        let services = ctx.data::<ApiServices>()?;
        let users = services.db.list_users_by_family(self.0.id).await.into_gql()?;
        Ok(users.into_iter().map(UserType).collect())
    }

    async fn tasks(&self, ctx: &Context<'_>) -> GqlResult<Vec<TaskType>> {
        let services = ctx.data::<ApiServices>()?;
        let tasks = services.db.list_tasks_by_family(self.0.id).await.into_gql()?;
        Ok(tasks.into_iter().map(TaskType).collect())
    }
}

pub struct UserType(pub User);

#[Object(name = "User")]
impl UserType {
    async fn id(&self) -> Uuid {
        self.0.id
    }

    async fn external_id(&self) -> &str {
        &self.0.external_id
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn first_name(&self) -> &str {
        &self.0.first_name
    }

    async fn last_name(&self) -> &str {
        &self.0.last_name
    }

    async fn role(&self) -> UserRoleValue {
        self.0.role.into()
    }

    async fn family_id(&self) -> Option<Uuid> {
        self.0.family_id
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.0.last_login_at
    }

    async fn family(&self, ctx: &Context<'_>) -> GqlResult<Option<FamilyType>> {
        let Some(family_id) = self.0.family_id else {
            return Ok(None);
        };
        let services = ctx.data::<ApiServices>()?;
        let family = found(services.db.get_family_by_id(family_id).await).into_gql()?;
        Ok(family.map(FamilyType))
    }

    async fn created_tasks(&self, ctx: &Context<'_>) -> GqlResult<Vec<TaskType>> {
        let services = ctx.data::<ApiServices>()?;
        let tasks = services.db.list_tasks_created_by(self.0.id).await.into_gql()?;
        Ok(tasks.into_iter().map(TaskType).collect())
    }

    async fn assigned_tasks(&self, ctx: &Context<'_>) -> GqlResult<Vec<TaskType>> {
        let services = ctx.data::<ApiServices>()?;
        let assignments = services.db.list_assignments_for_user(self.0.id).await.into_gql()?;
        let mut tasks = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let task = found(services.db.get_task_by_id(assignment.task_id).await).into_gql()?;
            if let Some(task) = task {
                tasks.push(TaskType(task));
            }
        }
        Ok(tasks)
    }
}

pub struct TaskType(pub Task);

#[Object(name = "Task")]
impl TaskType {
    async fn id(&self) -> Uuid {
        self.0.id
    }

    async fn family_id(&self) -> Uuid {
        self.0.family_id
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn created_by_id(&self) -> Uuid {
        self.0.created_by_id
    }

    async fn due_date(&self) -> Option<DateTime<Utc>> {
        self.0.due_date
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn is_completed(&self) -> bool {
        self.0.is_completed
    }

    async fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.0.completed_at
    }

    async fn family(&self, ctx: &Context<'_>) -> GqlResult<FamilyType> {
        let services = ctx.data::<ApiServices>()?;
        let family = services.db.get_family_by_id(self.0.family_id).await.into_gql()?;
        Ok(FamilyType(family))
    }

    async fn created_by(&self, ctx: &Context<'_>) -> GqlResult<UserType> {
        let services = ctx.data::<ApiServices>()?;
        let user = services.db.get_user_by_id(self.0.created_by_id).await.into_gql()?;
        Ok(UserType(user))
    }

    async fn assignments(&self, ctx: &Context<'_>) -> GqlResult<Vec<TaskAssignmentType>> {
        let services = ctx.data::<ApiServices>()?;
        let assignments = services.db.list_assignments_for_task(self.0.id).await.into_gql()?;
        Ok(assignments.into_iter().map(TaskAssignmentType).collect())
    }

    async fn assignees(&self, ctx: &Context<'_>) -> GqlResult<Vec<UserType>> {
        let services = ctx.data::<ApiServices>()?;
        let assignments = services.db.list_assignments_for_task(self.0.id).await.into_gql()?;
        let mut users = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let user = found(services.db.get_user_by_id(assignment.user_id).await).into_gql()?;
            if let Some(user) = user {
                users.push(UserType(user));
            }
        }
        Ok(users)
    }
}

pub struct TaskAssignmentType(pub TaskAssignment);

#[Object(name = "TaskAssignment")]
impl TaskAssignmentType {
    async fn task_id(&self) -> Uuid {
        self.0.task_id
    }

    async fn user_id(&self) -> Uuid {
        self.0.user_id
    }

    async fn task(&self, ctx: &Context<'_>) -> GqlResult<TaskType> {
        let services = ctx.data::<ApiServices>()?;
        let task = services.db.get_task_by_id(self.0.task_id).await.into_gql()?;
        Ok(TaskType(task))
    }

    async fn user(&self, ctx: &Context<'_>) -> GqlResult<UserType> {
        let services = ctx.data::<ApiServices>()?;
        let user = services.db.get_user_by_id(self.0.user_id).await.into_gql()?;
        Ok(UserType(user))
    }
}

/// Result of `registerNewUser`. Business-rule refusals come back here with
/// `success: false` rather than as errors.
#[derive(SimpleObject)]
pub struct RegisterNewUserPayload {
    pub success: bool,
    pub message: String,
    pub user: Option<UserType>,
    pub family: Option<FamilyType>,
}

impl From<RegistrationOutcome> for RegisterNewUserPayload {
    fn from(outcome: RegistrationOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            user: outcome.user.map(UserType),
            family: outcome.family.map(FamilyType),
        }
    }
}
