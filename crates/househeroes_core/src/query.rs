//! crates/househeroes_core/src/query.rs
//!
//! The filters and sort orders list queries accept. Only the fields named
//! here can be filtered or sorted on; anything else is unrepresentable.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::{Family, Task, User, UserRole};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> Sort<F> {
    /// Applies the direction to `ordering`, then breaks ties by ascending
    /// `(created_at, id)` whatever the direction.
    fn order(
        &self,
        ordering: Ordering,
        a: (DateTime<Utc>, Uuid),
        b: (DateTime<Utc>, Uuid),
    ) -> Ordering {
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.cmp(&b))
    }
}

//=========================================================================================
// Tasks
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Title,
    CreatedAt,
    DueDate,
    CompletedAt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub family_id: Option<Uuid>,
    pub is_completed: Option<bool>,
    pub created_by_id: Option<Uuid>,
    /// Only tasks assigned to this user.
    pub assigned_to_id: Option<Uuid>,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
}

impl TaskFilter {
    /// `assigned_task_ids` must be supplied when `assigned_to_id` is set;
    /// it holds the ids of the tasks assigned to that user.
    pub fn matches(&self, task: &Task, assigned_task_ids: Option<&HashSet<Uuid>>) -> bool {
        if self.family_id.is_some_and(|id| id != task.family_id) {
            return false;
        }
        if self.is_completed.is_some_and(|done| done != task.is_completed) {
            return false;
        }
        if self.created_by_id.is_some_and(|id| id != task.created_by_id) {
            return false;
        }
        if self.assigned_to_id.is_some()
            && !assigned_task_ids.is_some_and(|ids| ids.contains(&task.id))
        {
            return false;
        }
        if let Some(needle) = &self.title_contains {
            if !task.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

pub fn compare_tasks(sort: &Sort<TaskSortField>, a: &Task, b: &Task) -> Ordering {
    let ordering = match sort.field {
        TaskSortField::Title => a.title.cmp(&b.title),
        TaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        TaskSortField::DueDate => a.due_date.cmp(&b.due_date),
        TaskSortField::CompletedAt => a.completed_at.cmp(&b.completed_at),
    };
    sort.order(ordering, (a.created_at, a.id), (b.created_at, b.id))
}

pub fn apply_task_query(
    tasks: Vec<Task>,
    filter: &TaskFilter,
    sort: Option<&Sort<TaskSortField>>,
    assigned_task_ids: Option<&HashSet<Uuid>>,
) -> Vec<Task> {
    let mut tasks: Vec<Task> = tasks
        .into_iter()
        .filter(|task| filter.matches(task, assigned_task_ids))
        .collect();
    if let Some(sort) = sort {
        tasks.sort_by(|a, b| compare_tasks(sort, a, b));
    }
    tasks
}

//=========================================================================================
// Users
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    FirstName,
    LastName,
    Email,
    CreatedAt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub family_id: Option<Uuid>,
    pub role: Option<UserRole>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.family_id.map_or(true, |id| user.family_id == Some(id))
            && self.role.map_or(true, |role| user.role == role)
    }
}

pub fn apply_user_query(
    users: Vec<User>,
    filter: &UserFilter,
    sort: Option<&Sort<UserSortField>>,
) -> Vec<User> {
    let mut users: Vec<User> = users.into_iter().filter(|u| filter.matches(u)).collect();
    if let Some(sort) = sort {
        users.sort_by(|a, b| {
            let ordering = match sort.field {
                UserSortField::FirstName => a.first_name.cmp(&b.first_name),
                UserSortField::LastName => a.last_name.cmp(&b.last_name),
                UserSortField::Email => a.email.cmp(&b.email),
                UserSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            sort.order(ordering, (a.created_at, a.id), (b.created_at, b.id))
        });
    }
    users
}

//=========================================================================================
// Families
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilySortField {
    Name,
    CreatedAt,
}

pub fn apply_family_sort(
    mut families: Vec<Family>,
    sort: Option<&Sort<FamilySortField>>,
) -> Vec<Family> {
    if let Some(sort) = sort {
        families.sort_by(|a, b| {
            let ordering = match sort.field {
                FamilySortField::Name => a.name.cmp(&b.name),
                FamilySortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            sort.order(ordering, (a.created_at, a.id), (b.created_at, b.id))
        });
    }
    families
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewTask;
    use chrono::Duration;
    use rstest::rstest;

    fn task(title: &str, family_id: Uuid, done: bool, due_in_hours: Option<i64>) -> Task {
        let now = Utc::now();
        let mut task = Task::new(
            NewTask {
                family_id,
                title: title.to_string(),
                description: None,
                created_by_id: Uuid::new_v4(),
                due_date: due_in_hours.map(|h| now + Duration::hours(h)),
            },
            now,
        )
        .unwrap();
        if done {
            task.complete(now);
        }
        task
    }

    #[test]
    fn filters_combine_with_and() {
        let family = Uuid::new_v4();
        let tasks = vec![
            task("Mow the lawn", family, false, Some(2)),
            task("Clean bathroom", family, true, Some(1)),
            task("Mow again", Uuid::new_v4(), false, None),
        ];
        let filter = TaskFilter {
            family_id: Some(family),
            is_completed: Some(false),
            ..Default::default()
        };

        let result = apply_task_query(tasks, &filter, None, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Mow the lawn");
    }

    #[test]
    fn title_filter_is_case_insensitive() {
        let family = Uuid::new_v4();
        let tasks = vec![
            task("Feed the Dog", family, false, None),
            task("Homework", family, false, None),
        ];
        let filter = TaskFilter {
            title_contains: Some("dog".to_string()),
            ..Default::default()
        };
        let result = apply_task_query(tasks, &filter, None, None);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn assignee_filter_uses_the_supplied_ids() {
        let family = Uuid::new_v4();
        let wanted = task("Piano", family, false, None);
        let other = task("Lawn", family, false, None);
        let assigned: HashSet<Uuid> = [wanted.id].into_iter().collect();
        let filter = TaskFilter {
            assigned_to_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let result =
            apply_task_query(vec![other, wanted.clone()], &filter, None, Some(&assigned));
        assert_eq!(result, vec![wanted]);
    }

    #[test]
    fn sorts_by_due_date_descending() {
        let family = Uuid::new_v4();
        let tasks = vec![
            task("soon", family, false, Some(1)),
            task("later", family, false, Some(48)),
            task("middle", family, false, Some(5)),
        ];
        let sort = Sort { field: TaskSortField::DueDate, direction: SortDirection::Desc };
        let titles: Vec<String> = apply_task_query(tasks, &TaskFilter::default(), Some(&sort), None)
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["later", "middle", "soon"]);
    }

    #[rstest]
    #[case::ascending(SortDirection::Asc)]
    #[case::descending(SortDirection::Desc)]
    fn equal_keys_fall_back_to_creation_then_id(#[case] direction: SortDirection) {
        let family = Uuid::new_v4();
        let mut older = task("Homework", family, false, Some(3));
        older.created_at -= Duration::hours(2);
        let mut first = task("Homework", family, false, Some(3));
        let mut second = task("Homework", family, false, Some(3));
        first.created_at = older.created_at + Duration::hours(1);
        second.created_at = first.created_at;
        if second.id < first.id {
            std::mem::swap(&mut first, &mut second);
        }

        let sort = Sort { field: TaskSortField::Title, direction };
        let tasks = vec![second.clone(), first.clone(), older.clone()];
        let ids: Vec<Uuid> = apply_task_query(tasks, &TaskFilter::default(), Some(&sort), None)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![older.id, first.id, second.id]);
    }

    #[test]
    fn families_sort_by_name() {
        let now = Utc::now();
        let families = vec![
            Family::new("The Paquin Family", now).unwrap(),
            Family::new("The Johnson Family", now).unwrap(),
        ];
        let sort = Sort { field: FamilySortField::Name, direction: SortDirection::Asc };
        let sorted = apply_family_sort(families, Some(&sort));
        assert_eq!(sorted[0].name, "The Johnson Family");
    }
}
