//! services/api/src/web/rest.rs
//!
//! The small REST surface next to GraphQL: a flat task listing for simple
//! consumers, the health probe, and their OpenAPI description.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use househeroes_core::domain::{Family, Task, User};
use househeroes_core::ports::{DatabaseService, PortResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks_handler,
        health_handler,
    ),
    components(
        schemas(TaskSummary, FamilyRef, CreatorRef, AssigneeRef)
    ),
    tags(
        (name = "HouseHeroes API", description = "Family task management endpoints. The full API is served over GraphQL at /graphql.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// A task with its family, creator and assignees inlined.
#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub family: Option<FamilyRef>,
    pub created_by: Option<CreatorRef>,
    pub assignees: Vec<AssigneeRef>,
}

impl TaskSummary {
    fn build(
        task: Task,
        families: &HashMap<Uuid, Family>,
        users: &HashMap<Uuid, User>,
        assignee_ids: &[Uuid],
    ) -> Self {
        let family = families.get(&task.family_id).map(|f| FamilyRef {
            id: f.id,
            name: f.name.clone(),
        });
        let created_by = users.get(&task.created_by_id).map(|u| CreatorRef {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        });
        let assignees = assignee_ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(|u| AssigneeRef {
                id: u.id,
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
            })
            .collect();
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            created_at: task.created_at,
            is_completed: task.is_completed,
            completed_at: task.completed_at,
            family,
            created_by,
            assignees,
        }
    }
}

/// Loads every task with its relationships resolved in memory.
pub async fn load_task_summaries(db: &dyn DatabaseService) -> PortResult<Vec<TaskSummary>> {
    let tasks = db.list_tasks().await?;
    let families: HashMap<Uuid, Family> = db
        .list_families()
        .await?
        .into_iter()
        .map(|f| (f.id, f))
        .collect();
    let users: HashMap<Uuid, User> = db
        .list_users()
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let mut assignees: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for assignment in db.list_assignments().await? {
        assignees
            .entry(assignment.task_id)
            .or_default()
            .push(assignment.user_id);
    }

    Ok(tasks
        .into_iter()
        .map(|task| {
            let ids = assignees.get(&task.id).map(Vec::as_slice).unwrap_or(&[]);
            TaskSummary::build(task, &families, &users, ids)
        })
        .collect())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every task with its family, creator and assignees.
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "All tasks", body = [TaskSummary]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_tasks_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match load_task_summaries(app_state.db.as_ref()).await {
        Ok(summaries) => Ok(Json(summaries)),
        Err(e) => {
            error!("Failed to list tasks: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list tasks".to_string(),
            ))
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "The service is up", body = String)
    )
)]
pub async fn health_handler() -> &'static str {
    "Healthy"
}
