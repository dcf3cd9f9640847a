//! crates/househeroes_client/src/api.rs
//!
//! The typed API surface the view-models talk to. `GraphQlClient` is the
//! production implementation; tests substitute fakes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::client::GraphQlClient;
use crate::error::ClientError;
use crate::operations::{
    self, Family, NewTask, NewUser, Operation, RegisterNewUser, Registration, Task, TaskAssignment,
    User,
};

#[async_trait]
pub trait HouseHeroesApi: Send + Sync {
    async fn families(&self) -> Result<Vec<Family>, ClientError>;
    async fn users(&self) -> Result<Vec<User>, ClientError>;
    async fn tasks(&self) -> Result<Vec<Task>, ClientError>;
    async fn task_assignments(&self) -> Result<Vec<TaskAssignment>, ClientError>;

    async fn my_family(&self) -> Result<Option<Family>, ClientError>;
    async fn my_tasks(&self) -> Result<Vec<Task>, ClientError>;
    async fn family_members(&self) -> Result<Vec<User>, ClientError>;
    async fn current_user(&self) -> Result<Option<User>, ClientError>;
    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, ClientError>;

    async fn create_family(&self, name: &str) -> Result<Family, ClientError>;
    async fn create_user(&self, input: NewUser) -> Result<User, ClientError>;
    async fn create_task(&self, input: NewTask) -> Result<Task, ClientError>;
    async fn assign_task(&self, task_id: Uuid, user_id: Uuid)
        -> Result<TaskAssignment, ClientError>;
    async fn complete_task(&self, task_id: Uuid) -> Result<Task, ClientError>;
    async fn delete_task(&self, task_id: Uuid) -> Result<bool, ClientError>;
    async fn register_new_user(&self, input: RegisterNewUser) -> Result<Registration, ClientError>;
}

impl GraphQlClient {
    /// Runs `operation` and pulls the single root field `field` out of `data`.
    async fn root_field<V, T>(
        &self,
        operation: &Operation,
        field: &str,
        variables: V,
    ) -> Result<T, ClientError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let mut data: HashMap<String, T> = self.execute(operation, variables).await?;
        data.remove(field).ok_or(ClientError::MissingData)
    }
}

#[async_trait]
impl HouseHeroesApi for GraphQlClient {
    async fn families(&self) -> Result<Vec<Family>, ClientError> {
        self.root_field(&operations::GET_FAMILIES, "families", json!({})).await
    }

    async fn users(&self) -> Result<Vec<User>, ClientError> {
        self.root_field(&operations::GET_USERS, "users", json!({})).await
    }

    async fn tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.root_field(&operations::GET_TASKS, "tasks", json!({})).await
    }

    async fn task_assignments(&self) -> Result<Vec<TaskAssignment>, ClientError> {
        self.root_field(&operations::GET_TASK_ASSIGNMENTS, "taskAssignments", json!({}))
            .await
    }

    async fn my_family(&self) -> Result<Option<Family>, ClientError> {
        self.root_field(&operations::GET_MY_FAMILY, "myFamily", json!({})).await
    }

    async fn my_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.root_field(&operations::GET_MY_TASKS, "myTasks", json!({})).await
    }

    async fn family_members(&self) -> Result<Vec<User>, ClientError> {
        self.root_field(&operations::GET_FAMILY_MEMBERS, "familyMembers", json!({}))
            .await
    }

    async fn current_user(&self) -> Result<Option<User>, ClientError> {
        self.root_field(&operations::GET_CURRENT_USER, "currentUser", json!({}))
            .await
    }

    async fn task_by_id(&self, id: Uuid) -> Result<Option<Task>, ClientError> {
        self.root_field(&operations::GET_TASK_BY_ID, "taskById", json!({ "id": id }))
            .await
    }

    async fn create_family(&self, name: &str) -> Result<Family, ClientError> {
        let variables = json!({ "input": { "name": name } });
        self.root_field(&operations::CREATE_FAMILY, "createFamily", variables)
            .await
    }

    async fn create_user(&self, input: NewUser) -> Result<User, ClientError> {
        self.root_field(&operations::CREATE_USER, "createUser", json!({ "input": input }))
            .await
    }

    async fn create_task(&self, input: NewTask) -> Result<Task, ClientError> {
        self.root_field(&operations::CREATE_TASK, "createTask", json!({ "input": input }))
            .await
    }

    async fn assign_task(
        &self,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<TaskAssignment, ClientError> {
        let variables = json!({ "input": { "taskId": task_id, "userId": user_id } });
        self.root_field(&operations::ASSIGN_TASK, "assignTask", variables).await
    }

    async fn complete_task(&self, task_id: Uuid) -> Result<Task, ClientError> {
        let variables = json!({ "taskId": task_id });
        self.root_field(&operations::COMPLETE_TASK, "completeTask", variables)
            .await
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<bool, ClientError> {
        let variables = json!({ "taskId": task_id });
        self.root_field(&operations::DELETE_TASK, "deleteTask", variables).await
    }

    async fn register_new_user(&self, input: RegisterNewUser) -> Result<Registration, ClientError> {
        let variables = json!({ "input": input });
        self.root_field(&operations::REGISTER_NEW_USER, "registerNewUser", variables)
            .await
    }
}
