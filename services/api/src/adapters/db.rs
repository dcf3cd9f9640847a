//! services/api/src/adapters/db.rs
//!
//! PostgreSQL implementation of `DatabaseService`, on `sqlx` runtime queries.
//!
//! Relational rules (unique external ids and emails, assignment pairs, foreign
//! keys and cascades) live in the schema; constraint violations are mapped back onto
//! `PortError` variants here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use househeroes_core::domain::{Family, Task, TaskAssignment, User, UserRole};
use househeroes_core::ports::{Dataset, DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

const FAMILY_COLUMNS: &str = "id, name, created_at";
const USER_COLUMNS: &str =
    "id, external_id, email, first_name, last_name, role, family_id, created_at, last_login_at";
const TASK_COLUMNS: &str =
    "id, family_id, title, description, created_by_id, due_date, created_at, is_completed, completed_at";

/// Maps a `sqlx` failure onto the port's error vocabulary.
fn map_db_error(err: sqlx::Error, not_found: impl FnOnce() -> String) -> PortError {
    match err {
        sqlx::Error::RowNotFound => PortError::NotFound(not_found()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            PortError::NotFound(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_check_violation() => {
            PortError::Validation(db.message().to_string())
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

fn unexpected(err: sqlx::Error) -> PortError {
    PortError::Unexpected(err.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct FamilyRecord {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}
impl FamilyRecord {
    fn to_domain(self) -> Family {
        Family {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    external_id: String,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    family_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(User {
            id: self.id,
            external_id: self.external_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            family_id: self.family_id,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        })
    }
}

#[derive(FromRow)]
struct TaskRecord {
    id: Uuid,
    family_id: Uuid,
    title: String,
    description: Option<String>,
    created_by_id: Uuid,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
}
impl TaskRecord {
    fn to_domain(self) -> Task {
        Task {
            id: self.id,
            family_id: self.family_id,
            title: self.title,
            description: self.description,
            created_by_id: self.created_by_id,
            due_date: self.due_date,
            created_at: self.created_at,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
        }
    }
}

#[derive(FromRow)]
struct AssignmentRecord {
    task_id: Uuid,
    user_id: Uuid,
}
impl AssignmentRecord {
    fn to_domain(self) -> TaskAssignment {
        TaskAssignment {
            task_id: self.task_id,
            user_id: self.user_id,
        }
    }
}

fn users_to_domain(records: Vec<UserRecord>) -> PortResult<Vec<User>> {
    records.into_iter().map(UserRecord::to_domain).collect()
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- Families ---

    async fn insert_family(&self, family: Family) -> PortResult<Family> {
        let record = sqlx::query_as::<_, FamilyRecord>(&format!(
            "INSERT INTO families (id, name, created_at) VALUES ($1, $2, $3) RETURNING {FAMILY_COLUMNS}"
        ))
        .bind(family.id)
        .bind(&family.name)
        .bind(family.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Family {} not found", family.id)))?;
        Ok(record.to_domain())
    }

    async fn get_family_by_id(&self, family_id: Uuid) -> PortResult<Family> {
        let record = sqlx::query_as::<_, FamilyRecord>(&format!(
            "SELECT {FAMILY_COLUMNS} FROM families WHERE id = $1"
        ))
        .bind(family_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Family {} not found", family_id)))?;
        Ok(record.to_domain())
    }

    async fn list_families(&self) -> PortResult<Vec<Family>> {
        let records = sqlx::query_as::<_, FamilyRecord>(&format!(
            "SELECT {FAMILY_COLUMNS} FROM families ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn has_any_family(&self) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM families)")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }

    // --- Users ---

    async fn insert_user(&self, user: User) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, external_id, email, first_name, last_name, role, family_id, created_at, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.family_id)
        .bind(user.created_at)
        .bind(user.last_login_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("User {} not found", user.id)))?;
        record.to_domain()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("User {} not found", user_id)))?;
        record.to_domain()
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        users_to_domain(records)
    }

    async fn list_users_by_family(&self, family_id: Uuid) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE family_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(family_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        users_to_domain(records)
    }

    async fn update_last_login(&self, external_id: &str, at: DateTime<Utc>) -> PortResult<bool> {
        let result = sqlx::query("UPDATE users SET last_login_at = $2 WHERE external_id = $1")
            .bind(external_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    // --- Tasks ---

    async fn insert_task(&self, task: Task) -> PortResult<Task> {
        let record = sqlx::query_as::<_, TaskRecord>(&format!(
            "INSERT INTO tasks (id, family_id, title, description, created_by_id, due_date, created_at, is_completed, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id)
        .bind(task.family_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.created_by_id)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.is_completed)
        .bind(task.completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Task {} not found", task.id)))?;
        Ok(record.to_domain())
    }

    async fn get_task_by_id(&self, task_id: Uuid) -> PortResult<Task> {
        let record = sqlx::query_as::<_, TaskRecord>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(task_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Task {} not found", task_id)))?;
        Ok(record.to_domain())
    }

    async fn list_tasks(&self) -> PortResult<Vec<Task>> {
        let records = sqlx::query_as::<_, TaskRecord>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_tasks_by_family(&self, family_id: Uuid) -> PortResult<Vec<Task>> {
        let records = sqlx::query_as::<_, TaskRecord>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE family_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(family_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_tasks_created_by(&self, user_id: Uuid) -> PortResult<Vec<Task>> {
        let records = sqlx::query_as::<_, TaskRecord>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE created_by_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn complete_task(&self, task_id: Uuid, at: DateTime<Utc>) -> PortResult<Task> {
        let record = sqlx::query_as::<_, TaskRecord>(&format!(
            "UPDATE tasks SET is_completed = TRUE, completed_at = $2 WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(task_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("Task {} not found", task_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_task(&self, task_id: Uuid) -> PortResult<bool> {
        // Assignments go with the task via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    // --- Assignments ---

    async fn insert_assignment(&self, assignment: TaskAssignment) -> PortResult<TaskAssignment> {
        let record = sqlx::query_as::<_, AssignmentRecord>(
            "INSERT INTO task_assignments (task_id, user_id) VALUES ($1, $2) RETURNING task_id, user_id",
        )
        .bind(assignment.task_id)
        .bind(assignment.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match map_db_error(e, String::new) {
            PortError::Conflict(_) => PortError::Conflict(format!(
                "Task {} is already assigned to user {}",
                assignment.task_id, assignment.user_id
            )),
            other => other,
        })?;
        Ok(record.to_domain())
    }

    async fn list_assignments(&self) -> PortResult<Vec<TaskAssignment>> {
        let records = sqlx::query_as::<_, AssignmentRecord>(
            "SELECT task_id, user_id FROM task_assignments ORDER BY task_id, user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_assignments_for_task(&self, task_id: Uuid) -> PortResult<Vec<TaskAssignment>> {
        let records = sqlx::query_as::<_, AssignmentRecord>(
            "SELECT task_id, user_id FROM task_assignments WHERE task_id = $1 ORDER BY user_id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_assignments_for_user(&self, user_id: Uuid) -> PortResult<Vec<TaskAssignment>> {
        let records = sqlx::query_as::<_, AssignmentRecord>(
            "SELECT task_id, user_id FROM task_assignments WHERE user_id = $1 ORDER BY task_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    // --- Registration ---

    async fn insert_registration(&self, family: Option<Family>, user: User) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        if let Some(family) = &family {
            sqlx::query("INSERT INTO families (id, name, created_at) VALUES ($1, $2, $3)")
                .bind(family.id)
                .bind(&family.name)
                .bind(family.created_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error(e, || format!("Family {} not found", family.id)))?;
        }

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, external_id, email, first_name, last_name, role, family_id, created_at, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.family_id)
        .bind(user.created_at)
        .bind(user.last_login_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, || format!("User {} not found", user.id)))?;

        tx.commit().await.map_err(unexpected)?;
        record.to_domain()
    }

    // --- Bulk ---

    async fn insert_dataset(&self, dataset: Dataset) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        for family in &dataset.families {
            sqlx::query("INSERT INTO families (id, name, created_at) VALUES ($1, $2, $3)")
                .bind(family.id)
                .bind(&family.name)
                .bind(family.created_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error(e, || format!("Family {} not found", family.id)))?;
        }

        for user in &dataset.users {
            sqlx::query(
                "INSERT INTO users (id, external_id, email, first_name, last_name, role, family_id, created_at, last_login_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(user.id)
            .bind(&user.external_id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(user.family_id)
            .bind(user.created_at)
            .bind(user.last_login_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, || format!("User {} not found", user.id)))?;
        }

        for task in &dataset.tasks {
            sqlx::query(
                "INSERT INTO tasks (id, family_id, title, description, created_by_id, due_date, created_at, is_completed, completed_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(task.id)
            .bind(task.family_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.created_by_id)
            .bind(task.due_date)
            .bind(task.created_at)
            .bind(task.is_completed)
            .bind(task.completed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, || format!("Task {} not found", task.id)))?;
        }

        for assignment in &dataset.assignments {
            sqlx::query("INSERT INTO task_assignments (task_id, user_id) VALUES ($1, $2)")
                .bind(assignment.task_id)
                .bind(assignment.user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_db_error(e, String::new))?;
        }

        tx.commit().await.map_err(unexpected)
    }
}
