//! services/api/src/web/graphql/mutation.rs

use async_graphql::{Context, Object, Result as GqlResult};
use uuid::Uuid;

use super::errors::{auth_context, IntoGraphQl, RequireAuth};
use super::inputs::{
    AssignTaskInput, CreateFamilyInput, CreateTaskInput, CreateUserInput, RegisterNewUserInput,
};
use super::resolvers;
use super::types::{FamilyType, RegisterNewUserPayload, TaskAssignmentType, TaskType, UserType};
use super::ApiServices;

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_family(
        &self,
        ctx: &Context<'_>,
        input: CreateFamilyInput,
    ) -> GqlResult<FamilyType> {
        let services = ctx.data::<ApiServices>()?;
        let family = resolvers::create_family(services, &input.name).await.into_gql()?;
        Ok(FamilyType(family))
    }

    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> GqlResult<UserType> {
        let services = ctx.data::<ApiServices>()?;
        let user = resolvers::create_user(services, input.into()).await.into_gql()?;
        Ok(UserType(user))
    }

    async fn create_task(&self, ctx: &Context<'_>, input: CreateTaskInput) -> GqlResult<TaskType> {
        let services = ctx.data::<ApiServices>()?;
        let task = resolvers::create_task(services, input.into()).await.into_gql()?;
        Ok(TaskType(task))
    }

    /// Fails with `CONFLICT` when the user already holds the task.
    async fn assign_task(
        &self,
        ctx: &Context<'_>,
        input: AssignTaskInput,
    ) -> GqlResult<TaskAssignmentType> {
        let services = ctx.data::<ApiServices>()?;
        let assignment = resolvers::assign_task(services, input.into()).await.into_gql()?;
        Ok(TaskAssignmentType(assignment))
    }

    async fn complete_task(&self, ctx: &Context<'_>, task_id: Uuid) -> GqlResult<TaskType> {
        let services = ctx.data::<ApiServices>()?;
        let task = resolvers::complete_task(services, task_id).await.into_gql()?;
        Ok(TaskType(task))
    }

    /// `false` when there was no such task.
    async fn delete_task(&self, ctx: &Context<'_>, task_id: Uuid) -> GqlResult<bool> {
        let services = ctx.data::<ApiServices>()?;
        resolvers::delete_task(services, task_id).await.into_gql()
    }

    #[graphql(guard = "RequireAuth")]
    async fn register_new_user(
        &self,
        ctx: &Context<'_>,
        input: RegisterNewUserInput,
    ) -> GqlResult<RegisterNewUserPayload> {
        let services = ctx.data::<ApiServices>()?;
        let outcome = resolvers::register_new_user(services, auth_context(ctx), input.into())
            .await
            .into_gql()?;
        Ok(outcome.into())
    }
}
