//! crates/househeroes_core/src/memory.rs
//!
//! In-memory implementation of `DatabaseService`. Entities live in id-keyed
//! arenas and relationships are resolved by id, enforcing the same
//! constraints as the relational schema. Used by tests and by the API when
//! `DATABASE_BACKEND=memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::{Family, Task, TaskAssignment, User};
use crate::ports::{Dataset, DatabaseService, PortError, PortResult};

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<RwLock<Arena>>,
}

#[derive(Debug, Clone, Default)]
struct Arena {
    families: HashMap<Uuid, Family>,
    users: HashMap<Uuid, User>,
    external_index: HashMap<String, Uuid>,
    email_index: HashMap<String, Uuid>,
    tasks: HashMap<Uuid, Task>,
    assignments: HashSet<TaskAssignment>,
}

impl InMemoryDatabase {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PortResult<RwLockReadGuard<'_, Arena>> {
        self.state
            .read()
            .map_err(|err| PortError::Unexpected(err.to_string()))
    }

    fn write(&self) -> PortResult<RwLockWriteGuard<'_, Arena>> {
        self.state
            .write()
            .map_err(|err| PortError::Unexpected(err.to_string()))
    }
}

fn by_creation<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

fn sorted_users(users: impl Iterator<Item = User>) -> Vec<User> {
    by_creation(users.collect(), |u| (u.created_at, u.id))
}

fn sorted_tasks(tasks: impl Iterator<Item = Task>) -> Vec<Task> {
    by_creation(tasks.collect(), |t| (t.created_at, t.id))
}

fn sorted_assignments(assignments: impl Iterator<Item = TaskAssignment>) -> Vec<TaskAssignment> {
    by_creation(assignments.collect(), |a| (a.task_id, a.user_id))
}

impl Arena {
    /// Id, external id and email must all be unused.
    fn check_user_identity(&self, user: &User) -> PortResult<()> {
        if self.users.contains_key(&user.id) {
            return Err(PortError::Conflict(format!("User {} already exists", user.id)));
        }
        if self.external_index.contains_key(&user.external_id) {
            return Err(PortError::Conflict(format!(
                "A user with external id '{}' already exists",
                user.external_id
            )));
        }
        if self.email_index.contains_key(&user.email) {
            return Err(PortError::Conflict(format!(
                "A user with email '{}' already exists",
                user.email
            )));
        }
        Ok(())
    }

    fn check_new_user(&self, user: &User) -> PortResult<()> {
        self.check_user_identity(user)?;
        if let Some(family_id) = user.family_id {
            if !self.families.contains_key(&family_id) {
                return Err(PortError::NotFound(format!("Family {} not found", family_id)));
            }
        }
        Ok(())
    }

    fn store_user(&mut self, user: User) {
        self.external_index.insert(user.external_id.clone(), user.id);
        self.email_index.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    fn add_family(&mut self, family: Family) -> PortResult<()> {
        if self.families.contains_key(&family.id) {
            return Err(PortError::Conflict(format!("Family {} already exists", family.id)));
        }
        self.families.insert(family.id, family);
        Ok(())
    }

    fn add_user(&mut self, user: User) -> PortResult<()> {
        self.check_new_user(&user)?;
        self.store_user(user);
        Ok(())
    }

    fn add_task(&mut self, task: Task) -> PortResult<()> {
        if !self.families.contains_key(&task.family_id) {
            return Err(PortError::NotFound(format!("Family {} not found", task.family_id)));
        }
        if !self.users.contains_key(&task.created_by_id) {
            return Err(PortError::NotFound(format!("User {} not found", task.created_by_id)));
        }
        if self.tasks.contains_key(&task.id) {
            return Err(PortError::Conflict(format!("Task {} already exists", task.id)));
        }
        self.tasks.insert(task.id, task);
        Ok(())
    }

    fn add_assignment(&mut self, assignment: TaskAssignment) -> PortResult<()> {
        if !self.tasks.contains_key(&assignment.task_id) {
            return Err(PortError::NotFound(format!("Task {} not found", assignment.task_id)));
        }
        if !self.users.contains_key(&assignment.user_id) {
            return Err(PortError::NotFound(format!("User {} not found", assignment.user_id)));
        }
        if !self.assignments.insert(assignment) {
            return Err(PortError::Conflict(format!(
                "Task {} is already assigned to user {}",
                assignment.task_id, assignment.user_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn insert_family(&self, family: Family) -> PortResult<Family> {
        self.write()?.add_family(family.clone())?;
        Ok(family)
    }

    async fn get_family_by_id(&self, family_id: Uuid) -> PortResult<Family> {
        self.read()?
            .families
            .get(&family_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Family {} not found", family_id)))
    }

    async fn list_families(&self) -> PortResult<Vec<Family>> {
        let state = self.read()?;
        Ok(by_creation(
            state.families.values().cloned().collect(),
            |f| (f.created_at, f.id),
        ))
    }

    async fn has_any_family(&self) -> PortResult<bool> {
        Ok(!self.read()?.families.is_empty())
    }

    async fn insert_user(&self, user: User) -> PortResult<User> {
        self.write()?.add_user(user.clone())?;
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.read()?
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> PortResult<Option<User>> {
        let state = self.read()?;
        Ok(state
            .external_index
            .get(external_id)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(sorted_users(self.read()?.users.values().cloned()))
    }

    async fn list_users_by_family(&self, family_id: Uuid) -> PortResult<Vec<User>> {
        let state = self.read()?;
        Ok(sorted_users(
            state
                .users
                .values()
                .filter(|u| u.family_id == Some(family_id))
                .cloned(),
        ))
    }

    async fn update_last_login(&self, external_id: &str, at: DateTime<Utc>) -> PortResult<bool> {
        let mut state = self.write()?;
        let Some(id) = state.external_index.get(external_id).copied() else {
            return Ok(false);
        };
        match state.users.get_mut(&id) {
            Some(user) => {
                user.last_login_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_task(&self, task: Task) -> PortResult<Task> {
        self.write()?.add_task(task.clone())?;
        Ok(task)
    }

    async fn get_task_by_id(&self, task_id: Uuid) -> PortResult<Task> {
        self.read()?
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Task {} not found", task_id)))
    }

    async fn list_tasks(&self) -> PortResult<Vec<Task>> {
        Ok(sorted_tasks(self.read()?.tasks.values().cloned()))
    }

    async fn list_tasks_by_family(&self, family_id: Uuid) -> PortResult<Vec<Task>> {
        let state = self.read()?;
        Ok(sorted_tasks(
            state
                .tasks
                .values()
                .filter(|t| t.family_id == family_id)
                .cloned(),
        ))
    }

    async fn list_tasks_created_by(&self, user_id: Uuid) -> PortResult<Vec<Task>> {
        let state = self.read()?;
        Ok(sorted_tasks(
            state
                .tasks
                .values()
                .filter(|t| t.created_by_id == user_id)
                .cloned(),
        ))
    }

    async fn complete_task(&self, task_id: Uuid, at: DateTime<Utc>) -> PortResult<Task> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| PortError::NotFound(format!("Task {} not found", task_id)))?;
        task.complete(at);
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: Uuid) -> PortResult<bool> {
        let mut state = self.write()?;
        if state.tasks.remove(&task_id).is_none() {
            return Ok(false);
        }
        state.assignments.retain(|a| a.task_id != task_id);
        Ok(true)
    }

    async fn insert_assignment(&self, assignment: TaskAssignment) -> PortResult<TaskAssignment> {
        self.write()?.add_assignment(assignment)?;
        Ok(assignment)
    }

    async fn list_assignments(&self) -> PortResult<Vec<TaskAssignment>> {
        Ok(sorted_assignments(self.read()?.assignments.iter().copied()))
    }

    async fn list_assignments_for_task(&self, task_id: Uuid) -> PortResult<Vec<TaskAssignment>> {
        let state = self.read()?;
        Ok(sorted_assignments(
            state.assignments.iter().filter(|a| a.task_id == task_id).copied(),
        ))
    }

    async fn list_assignments_for_user(&self, user_id: Uuid) -> PortResult<Vec<TaskAssignment>> {
        let state = self.read()?;
        Ok(sorted_assignments(
            state.assignments.iter().filter(|a| a.user_id == user_id).copied(),
        ))
    }

    async fn insert_registration(&self, family: Option<Family>, user: User) -> PortResult<User> {
        let mut state = self.write()?;
        match family {
            Some(family) => {
                if state.families.contains_key(&family.id) {
                    return Err(PortError::Conflict(format!(
                        "Family {} already exists",
                        family.id
                    )));
                }
                // Nothing is written unless both rows are valid.
                state.check_user_identity(&user)?;
                state.families.insert(family.id, family);
            }
            None => state.check_new_user(&user)?,
        }
        state.store_user(user.clone());
        Ok(user)
    }

    async fn insert_dataset(&self, dataset: Dataset) -> PortResult<()> {
        let mut state = self.write()?;
        let mut staged = state.clone();
        for family in dataset.families {
            staged.add_family(family)?;
        }
        for user in dataset.users {
            staged.add_user(user)?;
        }
        for task in dataset.tasks {
            staged.add_task(task)?;
        }
        for assignment in dataset.assignments {
            staged.add_assignment(assignment)?;
        }
        *state = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTask, NewUser, UserRole};
    use rstest::{fixture, rstest};

    struct Fixture {
        db: InMemoryDatabase,
        family: Family,
        user: User,
    }

    fn user_in(family: Option<Uuid>, external_id: &str) -> User {
        User::new(
            NewUser {
                external_id: external_id.to_string(),
                email: format!("{external_id}@example.com"),
                first_name: "Emma".to_string(),
                last_name: "Paquin".to_string(),
                role: UserRole::Child,
                family_id: family,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn task_for(family: &Family, user: &User) -> Task {
        Task::new(
            NewTask {
                family_id: family.id,
                title: "Feed the dog".to_string(),
                description: None,
                created_by_id: user.id,
                due_date: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[fixture]
    async fn populated() -> Fixture {
        let db = InMemoryDatabase::new();
        let family = db
            .insert_family(Family::new("The Paquin Family", Utc::now()).unwrap())
            .await
            .unwrap();
        let user = db.insert_user(user_in(Some(family.id), "emma")).await.unwrap();
        Fixture { db, family, user }
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_external_id_is_a_conflict(#[future] populated: Fixture) {
        let f = populated.await;
        let result = f.db.insert_user(user_in(Some(f.family.id), "emma")).await;
        assert!(matches!(result, Err(PortError::Conflict(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_a_conflict(#[future] populated: Fixture) {
        let f = populated.await;
        let mut twin = user_in(None, "emma-second-account");
        twin.email = f.user.email.clone();

        let result = f.db.insert_user(twin.clone()).await;
        assert!(matches!(result, Err(PortError::Conflict(_))));

        let family = Family::new("The Other Paquins", Utc::now()).unwrap();
        twin.family_id = Some(family.id);
        let result = f.db.insert_registration(Some(family.clone()), twin).await;
        assert!(matches!(result, Err(PortError::Conflict(_))));
        assert!(f.db.get_family_by_id(family.id).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn users_must_reference_an_existing_family(#[future] populated: Fixture) {
        let f = populated.await;
        let result = f.db.insert_user(user_in(Some(Uuid::new_v4()), "lucas")).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));

        let familyless = f.db.insert_user(user_in(None, "lucas")).await.unwrap();
        assert_eq!(familyless.family_id, None);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_task_cascades_to_assignments(#[future] populated: Fixture) {
        let f = populated.await;
        let task = f.db.insert_task(task_for(&f.family, &f.user)).await.unwrap();
        let keep = f.db.insert_task(task_for(&f.family, &f.user)).await.unwrap();
        for task_id in [task.id, keep.id] {
            f.db.insert_assignment(TaskAssignment { task_id, user_id: f.user.id })
                .await
                .unwrap();
        }

        assert!(f.db.delete_task(task.id).await.unwrap());
        assert!(!f.db.delete_task(task.id).await.unwrap());

        let remaining = f.db.list_assignments().await.unwrap();
        assert_eq!(remaining, vec![TaskAssignment { task_id: keep.id, user_id: f.user.id }]);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_assignment_is_a_conflict(#[future] populated: Fixture) {
        let f = populated.await;
        let task = f.db.insert_task(task_for(&f.family, &f.user)).await.unwrap();
        let assignment = TaskAssignment { task_id: task.id, user_id: f.user.id };

        f.db.insert_assignment(assignment).await.unwrap();
        let again = f.db.insert_assignment(assignment).await;
        assert!(matches!(again, Err(PortError::Conflict(_))));
        assert_eq!(f.db.list_assignments_for_task(task.id).await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn completing_a_missing_task_is_not_found(#[future] populated: Fixture) {
        let f = populated.await;
        let result = f.db.complete_task(Uuid::new_v4(), Utc::now()).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn a_failing_dataset_writes_nothing(#[future] populated: Fixture) {
        let f = populated.await;
        let family = Family::new("The Johnson Family", Utc::now()).unwrap();
        let marc = user_in(Some(family.id), "marc");
        let dataset = Dataset {
            families: vec![family.clone()],
            users: vec![marc.clone()],
            tasks: vec![task_for(&family, &marc)],
            assignments: vec![TaskAssignment { task_id: Uuid::nil(), user_id: marc.id }],
        };

        let result = f.db.insert_dataset(dataset).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
        assert_eq!(f.db.list_families().await.unwrap(), vec![f.family.clone()]);
        assert!(f.db.find_user_by_external_id("marc").await.unwrap().is_none());
        assert_eq!(f.db.list_tasks().await.unwrap().len(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn registration_rolls_back_the_family_on_conflict(#[future] populated: Fixture) {
        let f = populated.await;
        let family = Family::new("Second", Utc::now()).unwrap();
        let result = f
            .db
            .insert_registration(Some(family.clone()), user_in(None, "emma"))
            .await;

        assert!(matches!(result, Err(PortError::Conflict(_))));
        assert!(matches!(
            f.db.get_family_by_id(family.id).await,
            Err(PortError::NotFound(_))
        ));
    }
}
