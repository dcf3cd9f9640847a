//! services/api/src/web/graphql/query.rs

use async_graphql::{Context, Object, Result as GqlResult};
use uuid::Uuid;

use super::errors::{auth_context, IntoGraphQl, RequireAuth};
use super::inputs::{
    FamilySortInput, TaskFilterInput, TaskSortInput, UserFilterInput, UserSortInput,
};
use super::resolvers;
use super::types::{FamilyType, TaskAssignmentType, TaskType, UserType};
use super::ApiServices;

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn families(
        &self,
        ctx: &Context<'_>,
        sort: Option<FamilySortInput>,
    ) -> GqlResult<Vec<FamilyType>> {
        let services = ctx.data::<ApiServices>()?;
        let families = resolvers::families(services, sort.map(Into::into)).await.into_gql()?;
        Ok(families.into_iter().map(FamilyType).collect())
    }

    async fn family(&self, ctx: &Context<'_>, id: Uuid) -> GqlResult<Option<FamilyType>> {
        let services = ctx.data::<ApiServices>()?;
        let family = resolvers::family(services, id).await.into_gql()?;
        Ok(family.map(FamilyType))
    }

    async fn users(
        &self,
        ctx: &Context<'_>,
        filter: Option<UserFilterInput>,
        sort: Option<UserSortInput>,
    ) -> GqlResult<Vec<UserType>> {
        let services = ctx.data::<ApiServices>()?;
        let filter = filter.unwrap_or_default().into();
        let users = resolvers::users(services, filter, sort.map(Into::into)).await.into_gql()?;
        Ok(users.into_iter().map(UserType).collect())
    }

    async fn user(&self, ctx: &Context<'_>, id: Uuid) -> GqlResult<Option<UserType>> {
        let services = ctx.data::<ApiServices>()?;
        let user = resolvers::user(services, id).await.into_gql()?;
        Ok(user.map(UserType))
    }

    async fn tasks(
        &self,
        ctx: &Context<'_>,
        filter: Option<TaskFilterInput>,
        sort: Option<TaskSortInput>,
    ) -> GqlResult<Vec<TaskType>> {
        let services = ctx.data::<ApiServices>()?;
        let filter = filter.unwrap_or_default().into();
        let tasks = resolvers::tasks(services, filter, sort.map(Into::into)).await.into_gql()?;
        Ok(tasks.into_iter().map(TaskType).collect())
    }

    async fn task_assignments(&self, ctx: &Context<'_>) -> GqlResult<Vec<TaskAssignmentType>> {
        let services = ctx.data::<ApiServices>()?;
        let assignments = resolvers::task_assignments(services).await.into_gql()?;
        Ok(assignments.into_iter().map(TaskAssignmentType).collect())
    }

    // --- Caller-scoped ---

    #[graphql(guard = "RequireAuth")]
    async fn my_family(&self, ctx: &Context<'_>) -> GqlResult<Option<FamilyType>> {
        let services = ctx.data::<ApiServices>()?;
        let family = resolvers::my_family(services, auth_context(ctx)).await.into_gql()?;
        Ok(family.map(FamilyType))
    }

    #[graphql(guard = "RequireAuth")]
    async fn my_tasks(
        &self,
        ctx: &Context<'_>,
        filter: Option<TaskFilterInput>,
        sort: Option<TaskSortInput>,
    ) -> GqlResult<Vec<TaskType>> {
        let services = ctx.data::<ApiServices>()?;
        let filter = filter.unwrap_or_default().into();
        let tasks = resolvers::my_tasks(services, auth_context(ctx), filter, sort.map(Into::into))
            .await
            .into_gql()?;
        Ok(tasks.into_iter().map(TaskType).collect())
    }

    #[graphql(guard = "RequireAuth")]
    async fn family_members(&self, ctx: &Context<'_>) -> GqlResult<Vec<UserType>> {
        let services = ctx.data::<ApiServices>()?;
        let members = resolvers::family_members(services, auth_context(ctx)).await.into_gql()?;
        Ok(members.into_iter().map(UserType).collect())
    }

    #[graphql(guard = "RequireAuth")]
    async fn current_user(&self, ctx: &Context<'_>) -> GqlResult<Option<UserType>> {
        let services = ctx.data::<ApiServices>()?;
        let user = resolvers::current_user(services, auth_context(ctx)).await.into_gql()?;
        Ok(user.map(UserType))
    }

    #[graphql(guard = "RequireAuth")]
    async fn task_by_id(&self, ctx: &Context<'_>, id: Uuid) -> GqlResult<Option<TaskType>> {
        let services = ctx.data::<ApiServices>()?;
        let task = resolvers::task_by_id(services, auth_context(ctx), id).await.into_gql()?;
        Ok(task.map(TaskType))
    }
}
