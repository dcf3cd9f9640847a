//! crates/househeroes_client/src/operations.rs
//!
//! Named GraphQL operations the client sends, with the shapes they return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

//=========================================================================================
// Response Shapes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Guardian,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub family_id: Option<Uuid>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub family_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Person>,
    #[serde(default)]
    pub assignees: Vec<Person>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    pub task_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub success: bool,
    pub message: String,
    pub user: Option<User>,
    pub family: Option<Family>,
}

//=========================================================================================
// Mutation Inputs
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub family_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub family_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_by_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNewUser {
    pub create_new_family: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_family_id: Option<Uuid>,
}

//=========================================================================================
// Documents
//=========================================================================================

macro_rules! task_fields {
    () => {
        "id familyId title description dueDate createdAt isCompleted completedAt createdBy { id firstName lastName } assignees { id firstName lastName }"
    };
}

macro_rules! operation {
    ($const_name:ident, $name:literal, $document:expr) => {
        pub const $const_name: Operation = Operation {
            name: $name,
            document: $document,
        };
    };
}

operation!(GET_FAMILIES, "GetFamilies", "query GetFamilies { families { id name createdAt } }");
operation!(
    GET_USERS,
    "GetUsers",
    "query GetUsers { users { id email firstName lastName role familyId } }"
);
operation!(
    GET_TASKS,
    "GetTasks",
    concat!("query GetTasks { tasks { ", task_fields!(), " } }")
);
operation!(
    GET_TASK_ASSIGNMENTS,
    "GetTaskAssignments",
    "query GetTaskAssignments { taskAssignments { taskId userId } }"
);
operation!(GET_MY_FAMILY, "GetMyFamily", "query GetMyFamily { myFamily { id name createdAt } }");
operation!(
    GET_MY_TASKS,
    "GetMyTasks",
    concat!("query GetMyTasks { myTasks { ", task_fields!(), " } }")
);
operation!(
    GET_FAMILY_MEMBERS,
    "GetFamilyMembers",
    "query GetFamilyMembers { familyMembers { id email firstName lastName role familyId } }"
);
operation!(
    GET_CURRENT_USER,
    "GetCurrentUser",
    "query GetCurrentUser { currentUser { id email firstName lastName role familyId } }"
);
operation!(
    GET_TASK_BY_ID,
    "GetTaskById",
    concat!("query GetTaskById($id: UUID!) { taskById(id: $id) { ", task_fields!(), " } }")
);
operation!(
    CREATE_FAMILY,
    "CreateFamily",
    "mutation CreateFamily($input: CreateFamilyInput!) { createFamily(input: $input) { id name createdAt } }"
);
operation!(
    CREATE_USER,
    "CreateUser",
    "mutation CreateUser($input: CreateUserInput!) { createUser(input: $input) { id email firstName lastName role familyId } }"
);
operation!(
    CREATE_TASK,
    "CreateTask",
    "mutation CreateTask($input: CreateTaskInput!) { createTask(input: $input) { id familyId title description dueDate createdAt isCompleted completedAt } }"
);
operation!(
    ASSIGN_TASK,
    "AssignTask",
    "mutation AssignTask($input: AssignTaskInput!) { assignTask(input: $input) { taskId userId } }"
);
operation!(
    COMPLETE_TASK,
    "CompleteTask",
    "mutation CompleteTask($taskId: UUID!) { completeTask(taskId: $taskId) { id familyId title description dueDate createdAt isCompleted completedAt } }"
);
operation!(
    DELETE_TASK,
    "DeleteTask",
    "mutation DeleteTask($taskId: UUID!) { deleteTask(taskId: $taskId) }"
);
operation!(
    REGISTER_NEW_USER,
    "RegisterNewUser",
    "mutation RegisterNewUser($input: RegisterNewUserInput!) { registerNewUser(input: $input) { success message user { id email firstName lastName role familyId } family { id name createdAt } } }"
);

/// Every operation the client knows, for listing and checks.
pub const ALL: [Operation; 16] = [
    GET_FAMILIES,
    GET_USERS,
    GET_TASKS,
    GET_TASK_ASSIGNMENTS,
    GET_MY_FAMILY,
    GET_MY_TASKS,
    GET_FAMILY_MEMBERS,
    GET_CURRENT_USER,
    GET_TASK_BY_ID,
    CREATE_FAMILY,
    CREATE_USER,
    CREATE_TASK,
    ASSIGN_TASK,
    COMPLETE_TASK,
    DELETE_TASK,
    REGISTER_NEW_USER,
];
