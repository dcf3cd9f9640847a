//! Runs every document the client ships against the live schema and decodes
//! the answers into the client's own response types.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chrono::{TimeZone, Utc};
use common::{app, run_operation, token_for};
use househeroes_client::client::GraphQlResponse;
use househeroes_client::operations::{
    self, Family, NewTask, NewUser, Operation, RegisterNewUser, Registration, Role, Task,
    TaskAssignment, User,
};
use househeroes_core::seed::seed_external_id;
use mockable::Clock;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

struct Session<'a> {
    router: &'a Router,
    token: String,
    ran: HashSet<&'static str>,
}

impl<'a> Session<'a> {
    fn new(router: &'a Router, token: String) -> Self {
        Self { router, token, ran: HashSet::new() }
    }

    /// Sends `operation` and decodes `field` the same way `GraphQlClient` does.
    async fn call<T: DeserializeOwned>(
        &mut self,
        operation: &Operation,
        field: &str,
        variables: Value,
    ) -> T {
        self.ran.insert(operation.name);
        let (status, body) =
            run_operation(self.router, Some(&self.token), operation, variables).await;
        assert_eq!(status, StatusCode::OK, "{}: {body}", operation.name);

        let envelope: GraphQlResponse<HashMap<String, T>> = serde_json::from_value(body.clone())
            .unwrap_or_else(|e| panic!("{} did not decode: {e}\n{body}", operation.name));
        let mut data = envelope
            .into_result()
            .unwrap_or_else(|e| panic!("{} was rejected: {e:?}", operation.name));
        data.remove(field)
            .unwrap_or_else(|| panic!("{} returned no `{field}`", operation.name))
    }
}

fn sarah_token() -> String {
    token_for(
        &seed_external_id("Sarah", "Paquin"),
        "sarah.paquin@email.com",
        "Sarah",
        "Paquin",
    )
}

#[tokio::test]
async fn every_client_operation_is_accepted_and_decodes() {
    let app = app(true).await;
    let mut session = Session::new(&app.router, sarah_token());

    let families: Vec<Family> =
        session.call(&operations::GET_FAMILIES, "families", json!({})).await;
    assert_eq!(families.len(), 2);

    let users: Vec<User> = session.call(&operations::GET_USERS, "users", json!({})).await;
    assert_eq!(users.len(), 10);

    let tasks: Vec<Task> = session.call(&operations::GET_TASKS, "tasks", json!({})).await;
    assert_eq!(tasks.len(), 11);
    assert!(tasks.iter().all(|t| t.created_by.is_some()));

    let assignments: Vec<TaskAssignment> = session
        .call(&operations::GET_TASK_ASSIGNMENTS, "taskAssignments", json!({}))
        .await;
    assert_eq!(assignments.len(), 15);

    let me: Option<User> =
        session.call(&operations::GET_CURRENT_USER, "currentUser", json!({})).await;
    let me = me.unwrap();
    assert_eq!(me.role, Role::Guardian);
    let family_id = me.family_id.unwrap();

    let my_family: Option<Family> =
        session.call(&operations::GET_MY_FAMILY, "myFamily", json!({})).await;
    assert_eq!(my_family.unwrap().name, "The Paquin Family");

    let members: Vec<User> =
        session.call(&operations::GET_FAMILY_MEMBERS, "familyMembers", json!({})).await;
    assert_eq!(members.len(), 4);
    let child = members.iter().find(|m| m.role == Role::Child).unwrap().clone();

    let my_tasks: Vec<Task> = session.call(&operations::GET_MY_TASKS, "myTasks", json!({})).await;
    assert!(!my_tasks.is_empty());
    let by_id: Option<Task> = session
        .call(&operations::GET_TASK_BY_ID, "taskById", json!({ "id": my_tasks[0].id }))
        .await;
    assert_eq!(by_id.map(|t| t.id), Some(my_tasks[0].id));

    let rivera: Family = session
        .call(
            &operations::CREATE_FAMILY,
            "createFamily",
            json!({ "input": { "name": "The Rivera Family" } }),
        )
        .await;
    let new_user = NewUser {
        external_id: "entra-ana".to_string(),
        email: "ana.rivera@email.com".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Rivera".to_string(),
        role: Role::Guardian,
        family_id: Some(rivera.id),
    };
    let ana: User = session
        .call(&operations::CREATE_USER, "createUser", json!({ "input": new_user }))
        .await;
    assert_eq!(ana.family_id, Some(rivera.id));

    let due = Utc.with_ymd_and_hms(2025, 9, 2, 18, 0, 0).unwrap();
    let new_task = NewTask {
        family_id,
        title: "Water the plants".to_string(),
        description: Some("Front porch and kitchen".to_string()),
        created_by_id: me.id,
        due_date: Some(due),
    };
    let created: Task = session
        .call(&operations::CREATE_TASK, "createTask", json!({ "input": new_task }))
        .await;
    assert_eq!(created.due_date, Some(due));
    assert!(!created.is_completed);

    let assignment: TaskAssignment = session
        .call(
            &operations::ASSIGN_TASK,
            "assignTask",
            json!({ "input": { "taskId": created.id, "userId": child.id } }),
        )
        .await;
    assert_eq!(assignment.user_id, child.id);

    let completed: Task = session
        .call(&operations::COMPLETE_TASK, "completeTask", json!({ "taskId": created.id }))
        .await;
    assert!(completed.is_completed);
    assert_eq!(completed.completed_at, Some(app.clock.utc()));

    let deleted: bool = session
        .call(&operations::DELETE_TASK, "deleteTask", json!({ "taskId": created.id }))
        .await;
    assert!(deleted);

    let mut newcomer = Session::new(
        &app.router,
        token_for("entra-newcomer", "lee.newcomer@email.com", "Lee", "Newcomer"),
    );
    let request = RegisterNewUser {
        create_new_family: true,
        family_name: Some("The Newcomer Family".to_string()),
        existing_family_id: None,
    };
    let registration: Registration = newcomer
        .call(&operations::REGISTER_NEW_USER, "registerNewUser", json!({ "input": request }))
        .await;
    assert!(registration.success, "{}", registration.message);
    assert_eq!(registration.user.unwrap().role, Role::Guardian);

    let ran: HashSet<&str> = session.ran.union(&newcomer.ran).copied().collect();
    let shipped: HashSet<&str> = operations::ALL.iter().map(|op| op.name).collect();
    assert_eq!(ran, shipped);
}
