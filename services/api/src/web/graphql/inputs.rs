//! services/api/src/web/graphql/inputs.rs
//!
//! Input objects and the enumerated filter and sort options accepted by the schema.

use async_graphql::{Enum, InputObject};
use chrono::{DateTime, Utc};
use househeroes_core::domain::{NewTask, NewUser, TaskAssignment, UserRole};
use househeroes_core::query::{
    FamilySortField, Sort, SortDirection, TaskFilter, TaskSortField, UserFilter, UserSortField,
};
use househeroes_core::registration::RegisterNewUserRequest;
use uuid::Uuid;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "UserRole")]
pub enum UserRoleValue {
    Guardian,
    Child,
}

impl From<UserRole> for UserRoleValue {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Guardian => Self::Guardian,
            UserRole::Child => Self::Child,
        }
    }
}

impl From<UserRoleValue> for UserRole {
    fn from(role: UserRoleValue) -> Self {
        match role {
            UserRoleValue::Guardian => Self::Guardian,
            UserRoleValue::Child => Self::Child,
        }
    }
}

//=========================================================================================
// Sorting
//=========================================================================================

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[graphql(name = "SortDirection")]
pub enum SortDirectionValue {
    #[default]
    Asc,
    Desc,
}

impl From<SortDirectionValue> for SortDirection {
    fn from(direction: SortDirectionValue) -> Self {
        match direction {
            SortDirectionValue::Asc => Self::Asc,
            SortDirectionValue::Desc => Self::Desc,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "TaskSortField")]
pub enum TaskSortFieldValue {
    Title,
    CreatedAt,
    DueDate,
    CompletedAt,
}

#[derive(InputObject, Debug)]
pub struct TaskSortInput {
    pub field: TaskSortFieldValue,
    #[graphql(default)]
    pub direction: SortDirectionValue,
}

impl From<TaskSortInput> for Sort<TaskSortField> {
    fn from(input: TaskSortInput) -> Self {
        let field = match input.field {
            TaskSortFieldValue::Title => TaskSortField::Title,
            TaskSortFieldValue::CreatedAt => TaskSortField::CreatedAt,
            TaskSortFieldValue::DueDate => TaskSortField::DueDate,
            TaskSortFieldValue::CompletedAt => TaskSortField::CompletedAt,
        };
        Sort { field, direction: input.direction.into() }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "UserSortField")]
pub enum UserSortFieldValue {
    FirstName,
    LastName,
    Email,
    CreatedAt,
}

#[derive(InputObject, Debug)]
pub struct UserSortInput {
    pub field: UserSortFieldValue,
    #[graphql(default)]
    pub direction: SortDirectionValue,
}

impl From<UserSortInput> for Sort<UserSortField> {
    fn from(input: UserSortInput) -> Self {
        let field = match input.field {
            UserSortFieldValue::FirstName => UserSortField::FirstName,
            UserSortFieldValue::LastName => UserSortField::LastName,
            UserSortFieldValue::Email => UserSortField::Email,
            UserSortFieldValue::CreatedAt => UserSortField::CreatedAt,
        };
        Sort { field, direction: input.direction.into() }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "FamilySortField")]
pub enum FamilySortFieldValue {
    Name,
    CreatedAt,
}

#[derive(InputObject, Debug)]
pub struct FamilySortInput {
    pub field: FamilySortFieldValue,
    #[graphql(default)]
    pub direction: SortDirectionValue,
}

impl From<FamilySortInput> for Sort<FamilySortField> {
    fn from(input: FamilySortInput) -> Self {
        let field = match input.field {
            FamilySortFieldValue::Name => FamilySortField::Name,
            FamilySortFieldValue::CreatedAt => FamilySortField::CreatedAt,
        };
        Sort { field, direction: input.direction.into() }
    }
}

//=========================================================================================
// Filtering
//=========================================================================================

#[derive(InputObject, Debug, Default)]
pub struct TaskFilterInput {
    pub family_id: Option<Uuid>,
    pub is_completed: Option<bool>,
    pub created_by_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
    pub title_contains: Option<String>,
}

impl From<TaskFilterInput> for TaskFilter {
    fn from(input: TaskFilterInput) -> Self {
        Self {
            family_id: input.family_id,
            is_completed: input.is_completed,
            created_by_id: input.created_by_id,
            assigned_to_id: input.assigned_to_id,
            title_contains: input.title_contains.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(InputObject, Debug, Default)]
pub struct UserFilterInput {
    pub family_id: Option<Uuid>,
    pub role: Option<UserRoleValue>,
}

impl From<UserFilterInput> for UserFilter {
    fn from(input: UserFilterInput) -> Self {
        Self {
            family_id: input.family_id,
            role: input.role.map(Into::into),
        }
    }
}

//=========================================================================================
// Mutation Inputs
//=========================================================================================

#[derive(InputObject, Debug)]
pub struct CreateFamilyInput {
    pub name: String,
}

#[derive(InputObject, Debug)]
pub struct CreateUserInput {
    pub external_id: String,
    pub email: String,
    #[graphql(default)]
    pub first_name: String,
    #[graphql(default)]
    pub last_name: String,
    pub role: UserRoleValue,
    pub family_id: Option<Uuid>,
}

impl From<CreateUserInput> for NewUser {
    fn from(input: CreateUserInput) -> Self {
        Self {
            external_id: input.external_id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role.into(),
            family_id: input.family_id,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CreateTaskInput {
    pub family_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_by_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<CreateTaskInput> for NewTask {
    fn from(input: CreateTaskInput) -> Self {
        Self {
            family_id: input.family_id,
            title: input.title,
            description: input.description,
            created_by_id: input.created_by_id,
            due_date: input.due_date,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct AssignTaskInput {
    pub task_id: Uuid,
    pub user_id: Uuid,
}

impl From<AssignTaskInput> for TaskAssignment {
    fn from(input: AssignTaskInput) -> Self {
        Self { task_id: input.task_id, user_id: input.user_id }
    }
}

#[derive(InputObject, Debug, Default)]
pub struct RegisterNewUserInput {
    #[graphql(default)]
    pub create_new_family: bool,
    pub family_name: Option<String>,
    pub existing_family_id: Option<Uuid>,
}

impl From<RegisterNewUserInput> for RegisterNewUserRequest {
    fn from(input: RegisterNewUserInput) -> Self {
        Self {
            create_new_family: input.create_new_family,
            family_name: input.family_name,
            existing_family_id: input.existing_family_id,
        }
    }
}
