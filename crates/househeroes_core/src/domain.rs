//! crates/househeroes_core/src/domain.rs
//!
//! Families, users, tasks and assignments, with the field rules every store
//! enforces before writing.
//! Relationships are plain id fields; callers resolve them through the
//! `DatabaseService` port instead of following object references.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

pub const MAX_FAMILY_NAME_LEN: usize = 200;
pub const MAX_TASK_TITLE_LEN: usize = 200;
pub const MAX_TASK_DESCRIPTION_LEN: usize = 1000;
pub const MAX_EMAIL_LEN: usize = 256;
pub const MAX_PERSON_NAME_LEN: usize = 100;
pub const MAX_EXTERNAL_ID_LEN: usize = 256;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

//=========================================================================================
// Validation Errors
//=========================================================================================

/// Raised when an entity would violate one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("unknown user role '{0}'")]
    UnknownRole(String),
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::Required { field });
    }
    bounded_text(field, value, max)
}

fn bounded_text(field: &'static str, value: &str, max: usize) -> Result<String, DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::TooLong { field, max });
    }
    Ok(value.to_string())
}

/// Checks the shape of an email address (one `@`, a dotted domain, no spaces).
pub fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = required_text("email", email, MAX_EMAIL_LEN)?;
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(DomainError::InvalidEmail(email));
    }
    Ok(email)
}

//=========================================================================================
// Family
//=========================================================================================

/// A household group of users sharing tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Family {
    pub fn new(name: &str, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required_text("name", name, MAX_FAMILY_NAME_LEN)?,
            created_at,
        })
    }
}

//=========================================================================================
// User
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Guardian,
    Child,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guardian => "Guardian",
            Self::Child => "Child",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Guardian" => Ok(Self::Guardian),
            "Child" => Ok(Self::Child),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// An application account, linked to an identity-provider subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    /// `None` until the user creates or joins a family.
    pub family_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The caller-supplied part of a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub family_id: Option<Uuid>,
}

impl User {
    pub fn new(new_user: NewUser, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            external_id: required_text("externalId", &new_user.external_id, MAX_EXTERNAL_ID_LEN)?,
            email: validate_email(&new_user.email)?,
            first_name: bounded_text("firstName", new_user.first_name.trim(), MAX_PERSON_NAME_LEN)?,
            last_name: bounded_text("lastName", new_user.last_name.trim(), MAX_PERSON_NAME_LEN)?,
            role: new_user.role,
            family_id: new_user.family_id,
            created_at,
            last_login_at: None,
        })
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

//=========================================================================================
// Task
//=========================================================================================

/// A unit of household work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub family_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_by_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    /// Set if and only if `is_completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub family_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_by_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(new_task: NewTask, created_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let description = match new_task.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                Some(bounded_text("description", text, MAX_TASK_DESCRIPTION_LEN)?)
            }
            _ => None,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            family_id: new_task.family_id,
            title: required_text("title", &new_task.title, MAX_TASK_TITLE_LEN)?,
            description,
            created_by_id: new_task.created_by_id,
            due_date: new_task.due_date,
            created_at,
            is_completed: false,
            completed_at: None,
        })
    }

    /// Marks the task done. Calling it again re-stamps `completed_at`.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }
}

//=========================================================================================
// TaskAssignment
//=========================================================================================

/// Many-to-many link between a task and the user responsible for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskAssignment {
    pub task_id: Uuid,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            external_id: "sub-123".to_string(),
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            role: UserRole::Guardian,
            family_id: None,
        }
    }

    #[test]
    fn family_name_is_trimmed_and_required() {
        let family = Family::new("  The Smiths ", now()).unwrap();
        assert_eq!(family.name, "The Smiths");

        assert_eq!(
            Family::new("   ", now()),
            Err(DomainError::Required { field: "name" })
        );
    }

    #[test]
    fn family_name_is_bounded() {
        let long = "x".repeat(MAX_FAMILY_NAME_LEN + 1);
        assert_eq!(
            Family::new(&long, now()),
            Err(DomainError::TooLong { field: "name", max: MAX_FAMILY_NAME_LEN })
        );
        assert!(Family::new(&"x".repeat(MAX_FAMILY_NAME_LEN), now()).is_ok());
    }

    #[rstest]
    #[case("sarah.paquin@email.com", true)]
    #[case("a@b.io", true)]
    #[case("no-at-sign.com", false)]
    #[case("two@@signs.com", false)]
    #[case("space in@mail.com", false)]
    #[case("missing@tld", false)]
    #[case("", false)]
    fn email_format(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(User::new(new_user(email), now()).is_ok(), valid);
    }

    #[test]
    fn user_starts_without_last_login() {
        let user = User::new(new_user("ada@example.com"), now()).unwrap();
        assert_eq!(user.last_login_at, None);
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!("Guardian".parse::<UserRole>(), Ok(UserRole::Guardian));
        assert_eq!(UserRole::Child.to_string(), "Child");
        assert!(matches!(
            "Parent".parse::<UserRole>(),
            Err(DomainError::UnknownRole(_))
        ));
    }

    #[test]
    fn task_validation_and_completion() {
        let mut task = Task::new(
            NewTask {
                family_id: Uuid::new_v4(),
                title: "Take out trash".to_string(),
                description: Some("   ".to_string()),
                created_by_id: Uuid::new_v4(),
                due_date: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(task.description, None);
        assert!(!task.is_completed);
        assert_eq!(task.completed_at, None);

        let first = now();
        task.complete(first);
        assert!(task.is_completed);
        assert_eq!(task.completed_at, Some(first));

        let second = first + chrono::Duration::minutes(5);
        task.complete(second);
        assert_eq!(task.completed_at, Some(second));
    }

    #[test]
    fn task_description_is_bounded() {
        let result = Task::new(
            NewTask {
                family_id: Uuid::new_v4(),
                title: "Homework".to_string(),
                description: Some("d".repeat(MAX_TASK_DESCRIPTION_LEN + 1)),
                created_by_id: Uuid::new_v4(),
                due_date: None,
            },
            now(),
        );
        assert_eq!(
            result,
            Err(DomainError::TooLong { field: "description", max: MAX_TASK_DESCRIPTION_LEN })
        );
    }
}
