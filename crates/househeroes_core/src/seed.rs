//! crates/househeroes_core/src/seed.rs
//!
//! Populates an empty database with a fixed sample dataset: two families,
//! ten users, eleven tasks and fifteen assignments. Times are relative to
//! the injected clock.

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::info;

use crate::clock::SharedClock;
use crate::domain::{Family, NewTask, NewUser, Task, TaskAssignment, User, UserRole};
use crate::ports::{Dataset, DatabaseService, PortResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// At least one family existed, nothing was written.
    AlreadySeeded,
    Seeded {
        families: usize,
        users: usize,
        tasks: usize,
        assignments: usize,
    },
}

struct SeedFamily {
    name: &'static str,
    created_days_ago: i64,
}

struct SeedUser {
    first_name: &'static str,
    last_name: &'static str,
    role: UserRole,
    family: usize,
}

/// Offsets are hours relative to "now"; negative is in the past.
struct SeedTask {
    family: usize,
    title: &'static str,
    description: &'static str,
    created_by: usize,
    created_offset_hours: i64,
    due_offset_hours: i64,
    completed_offset_hours: Option<i64>,
}

const FAMILIES: [SeedFamily; 2] = [
    SeedFamily { name: "The Paquin Family", created_days_ago: 30 },
    SeedFamily { name: "The Johnson Family", created_days_ago: 45 },
];

const PAQUIN: usize = 0;
const JOHNSON: usize = 1;

// Indices into USERS, used by the task and assignment tables below.
const SARAH: usize = 0;
const MIKE: usize = 1;
const EMMA: usize = 2;
const LUCAS: usize = 3;
const MARC: usize = 4;
const JESSICA: usize = 5;
const ALEX: usize = 6;
const SOPHIA: usize = 7;
const ETHAN: usize = 8;
const MIA: usize = 9;

const fn user(
    first_name: &'static str,
    last_name: &'static str,
    role: UserRole,
    family: usize,
) -> SeedUser {
    SeedUser { first_name, last_name, role, family }
}

const USERS: [SeedUser; 10] = [
    user("Sarah", "Paquin", UserRole::Guardian, PAQUIN),
    user("Mike", "Paquin", UserRole::Guardian, PAQUIN),
    user("Emma", "Paquin", UserRole::Child, PAQUIN),
    user("Lucas", "Paquin", UserRole::Child, PAQUIN),
    user("Marc", "Johnson", UserRole::Guardian, JOHNSON),
    user("Jessica", "Johnson", UserRole::Guardian, JOHNSON),
    user("Alex", "Johnson", UserRole::Child, JOHNSON),
    user("Sophia", "Johnson", UserRole::Child, JOHNSON),
    user("Ethan", "Johnson", UserRole::Child, JOHNSON),
    user("Mia", "Johnson", UserRole::Child, JOHNSON),
];

const TASKS: [SeedTask; 11] = [
    SeedTask {
        family: PAQUIN,
        title: "Take out trash",
        description: "Put trash bins on the curb every Tuesday evening",
        created_by: SARAH,
        created_offset_hours: -7 * 24,
        due_offset_hours: 24,
        completed_offset_hours: None,
    },
    SeedTask {
        family: PAQUIN,
        title: "Clean bedroom",
        description: "Make bed, organize toys, vacuum floor",
        created_by: SARAH,
        created_offset_hours: -5 * 24,
        due_offset_hours: 0,
        completed_offset_hours: Some(-2),
    },
    SeedTask {
        family: PAQUIN,
        title: "Load dishwasher",
        description: "After dinner, load and start the dishwasher",
        created_by: MIKE,
        created_offset_hours: -3 * 24,
        due_offset_hours: 2,
        completed_offset_hours: None,
    },
    SeedTask {
        family: PAQUIN,
        title: "Feed the dog",
        description: "Give Rex his morning and evening meals",
        created_by: SARAH,
        created_offset_hours: -10 * 24,
        due_offset_hours: -8,
        completed_offset_hours: Some(-8),
    },
    SeedTask {
        family: PAQUIN,
        title: "Homework time",
        description: "Complete math and reading assignments",
        created_by: MIKE,
        created_offset_hours: -24,
        due_offset_hours: 4,
        completed_offset_hours: None,
    },
    SeedTask {
        family: JOHNSON,
        title: "Mow the lawn",
        description: "Cut grass in front and back yard, edge walkways",
        created_by: MARC,
        created_offset_hours: -4 * 24,
        due_offset_hours: 2 * 24,
        completed_offset_hours: None,
    },
    SeedTask {
        family: JOHNSON,
        title: "Grocery shopping",
        description: "Buy items from the weekly grocery list",
        created_by: JESSICA,
        created_offset_hours: -2 * 24,
        due_offset_hours: 24,
        completed_offset_hours: None,
    },
    SeedTask {
        family: JOHNSON,
        title: "Soccer practice pickup",
        description: "Pick up kids from soccer practice at 6 PM",
        created_by: MARC,
        created_offset_hours: -6,
        due_offset_hours: -1,
        completed_offset_hours: Some(-1),
    },
    SeedTask {
        family: JOHNSON,
        title: "Clean bathroom",
        description: "Scrub toilet, clean shower, mop floor",
        created_by: JESSICA,
        created_offset_hours: -6 * 24,
        due_offset_hours: 24,
        completed_offset_hours: None,
    },
    SeedTask {
        family: JOHNSON,
        title: "Piano practice",
        description: "Practice piano for 30 minutes",
        created_by: JESSICA,
        created_offset_hours: -8 * 24,
        due_offset_hours: 0,
        completed_offset_hours: None,
    },
    SeedTask {
        family: JOHNSON,
        title: "Set table for dinner",
        description: "Put out plates, silverware, and napkins",
        created_by: MARC,
        created_offset_hours: -4,
        due_offset_hours: 1,
        completed_offset_hours: None,
    },
];

/// (task index, user index)
const ASSIGNMENTS: [(usize, usize); 15] = [
    (0, LUCAS),
    (1, EMMA),
    (2, EMMA),
    (2, LUCAS),
    (3, EMMA),
    (4, EMMA),
    (4, LUCAS),
    (5, ALEX),
    (5, ETHAN),
    (6, JESSICA),
    (7, MARC),
    (8, SOPHIA),
    (8, MIA),
    (9, SOPHIA),
    (10, ALEX),
];

fn hours_from(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now + Duration::hours(hours)
}

/// The external id given to a seeded user; seeded accounts never sign in.
pub fn seed_external_id(first_name: &str, last_name: &str) -> String {
    format!("seed|{}.{}", first_name.to_lowercase(), last_name.to_lowercase())
}

/// Builds the sample rows with timestamps relative to `now`.
pub fn sample_dataset(now: DateTime<Utc>) -> PortResult<Dataset> {
    let families = FAMILIES
        .iter()
        .map(|seed| Family::new(seed.name, now - Duration::days(seed.created_days_ago)))
        .collect::<Result<Vec<_>, _>>()?;

    let users = USERS
        .iter()
        .map(|seed| {
            User::new(
                NewUser {
                    external_id: seed_external_id(seed.first_name, seed.last_name),
                    email: format!(
                        "{}.{}@email.com",
                        seed.first_name.to_lowercase(),
                        seed.last_name.to_lowercase()
                    ),
                    first_name: seed.first_name.to_string(),
                    last_name: seed.last_name.to_string(),
                    role: seed.role,
                    family_id: Some(families[seed.family].id),
                },
                now,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut tasks: Vec<Task> = Vec::with_capacity(TASKS.len());
    for seed in &TASKS {
        let mut task = Task::new(
            NewTask {
                family_id: families[seed.family].id,
                title: seed.title.to_string(),
                description: Some(seed.description.to_string()),
                created_by_id: users[seed.created_by].id,
                due_date: Some(hours_from(now, seed.due_offset_hours)),
            },
            hours_from(now, seed.created_offset_hours),
        )?;
        if let Some(offset) = seed.completed_offset_hours {
            task.complete(hours_from(now, offset));
        }
        tasks.push(task);
    }

    let assignments = ASSIGNMENTS
        .iter()
        .map(|&(task, user)| TaskAssignment {
            task_id: tasks[task].id,
            user_id: users[user].id,
        })
        .collect();

    Ok(Dataset {
        families,
        users,
        tasks,
        assignments,
    })
}

/// Inserts the sample dataset unless any family already exists. The rows are
/// written in one atomic batch, so a failed seed leaves the store empty.
pub async fn seed_database(
    db: &dyn DatabaseService,
    clock: &SharedClock,
) -> PortResult<SeedOutcome> {
    if db.has_any_family().await? {
        info!("Database already contains families; skipping seed.");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let dataset = sample_dataset(clock.utc())?;
    let outcome = SeedOutcome::Seeded {
        families: dataset.families.len(),
        users: dataset.users.len(),
        tasks: dataset.tasks.len(),
        assignments: dataset.assignments.len(),
    };
    db.insert_dataset(dataset).await?;

    info!("Seeded sample data: {:?}", outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;
    use crate::ports::PortError;
    use mockable::DefaultClock;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_twice_writes_one_fixture() {
        let db = InMemoryDatabase::new();
        let clock: SharedClock = Arc::new(DefaultClock);

        let first = seed_database(&db, &clock).await.unwrap();
        assert_eq!(
            first,
            SeedOutcome::Seeded { families: 2, users: 10, tasks: 11, assignments: 15 }
        );

        let second = seed_database(&db, &clock).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadySeeded);

        assert_eq!(db.list_families().await.unwrap().len(), 2);
        assert_eq!(db.list_users().await.unwrap().len(), 10);
        assert_eq!(db.list_tasks().await.unwrap().len(), 11);
        assert_eq!(db.list_assignments().await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn seeded_tasks_respect_the_completion_invariant() {
        let db = InMemoryDatabase::new();
        let clock: SharedClock = Arc::new(DefaultClock);
        seed_database(&db, &clock).await.unwrap();

        let tasks = db.list_tasks().await.unwrap();
        assert_eq!(tasks.iter().filter(|t| t.is_completed).count(), 3);
        for task in tasks {
            assert_eq!(task.is_completed, task.completed_at.is_some());
        }
    }

    #[tokio::test]
    async fn seeded_users_belong_to_their_families() {
        let db = InMemoryDatabase::new();
        let clock: SharedClock = Arc::new(DefaultClock);
        seed_database(&db, &clock).await.unwrap();

        let families = db.list_families().await.unwrap();
        let johnson = families
            .iter()
            .find(|f| f.name == "The Johnson Family")
            .unwrap();
        let members = db.list_users_by_family(johnson.id).await.unwrap();
        assert_eq!(members.len(), 6);
        assert_eq!(
            members.iter().filter(|u| u.role == UserRole::Guardian).count(),
            2
        );
        assert!(members
            .iter()
            .any(|u| u.email == "jessica.johnson@email.com"));
    }

    #[tokio::test]
    async fn a_failed_seed_leaves_no_partial_data() {
        let db = InMemoryDatabase::new();
        let clock: SharedClock = Arc::new(DefaultClock);
        let squatter = User::new(
            NewUser {
                external_id: "entra-squatter".to_string(),
                email: "mia.johnson@email.com".to_string(),
                first_name: "Mia".to_string(),
                last_name: "Johnson".to_string(),
                role: UserRole::Child,
                family_id: None,
            },
            clock.utc(),
        )
        .unwrap();
        db.insert_user(squatter).await.unwrap();

        let result = seed_database(&db, &clock).await;
        assert!(matches!(result, Err(PortError::Conflict(_))));
        assert!(!db.has_any_family().await.unwrap());
        assert_eq!(db.list_users().await.unwrap().len(), 1);
        assert!(db.list_tasks().await.unwrap().is_empty());
    }

    #[test]
    fn seed_external_ids_are_unique() {
        let mut ids: Vec<String> = USERS
            .iter()
            .map(|u| seed_external_id(u.first_name, u.last_name))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), USERS.len());
    }
}
