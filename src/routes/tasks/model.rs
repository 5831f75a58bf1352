use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How far out a deadline still counts as "due soon".
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

/// Closed set of task categories, stored as the `task_category` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_category", rename_all = "PascalCase")]
pub enum Category {
    Work,
    Personal,
    Learning,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Learning => "Learning",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Work" => Ok(Self::Work),
            "Personal" => Ok(Self::Personal),
            "Learning" => Ok(Self::Learning),
            "Other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Deadline set, strictly in the future, and within 24 hours of `now`.
    pub fn is_due_soon(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => {
                deadline > now && deadline - now <= Duration::hours(DUE_SOON_WINDOW_HOURS)
            }
            None => false,
        }
    }

    /// Deadline set and strictly in the past, regardless of completion.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Whole hours until the deadline, floored. `None` when no deadline is set.
    pub fn hours_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline.map(|deadline| (deadline - now).num_hours())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_due_at(deadline: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "test".to_string(),
            description: None,
            category: Category::default(),
            deadline,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn due_soon_window_boundaries() {
        let now = Utc::now();

        let in_window = task_due_at(Some(now + Duration::minutes(23 * 60 + 59)));
        assert!(in_window.is_due_soon(now));

        let at_window_edge = task_due_at(Some(now + Duration::hours(24)));
        assert!(at_window_edge.is_due_soon(now));

        let beyond = task_due_at(Some(now + Duration::hours(25)));
        assert!(!beyond.is_due_soon(now));

        // The virtual excludes a deadline exactly at `now`.
        let exactly_now = task_due_at(Some(now));
        assert!(!exactly_now.is_due_soon(now));

        let past = task_due_at(Some(now - Duration::minutes(1)));
        assert!(!past.is_due_soon(now));

        let no_deadline = task_due_at(None);
        assert!(!no_deadline.is_due_soon(now));
    }

    #[test]
    fn overdue_is_strictly_past() {
        let now = Utc::now();
        assert!(task_due_at(Some(now - Duration::minutes(1))).is_overdue(now));
        assert!(!task_due_at(Some(now)).is_overdue(now));
        assert!(!task_due_at(Some(now + Duration::minutes(1))).is_overdue(now));
        assert!(!task_due_at(None).is_overdue(now));
    }

    #[test]
    fn hours_remaining_floors() {
        let now = Utc::now();
        let task = task_due_at(Some(now + Duration::minutes(90)));
        assert_eq!(task.hours_remaining(now), Some(1));

        let task = task_due_at(Some(now + Duration::minutes(59)));
        assert_eq!(task.hours_remaining(now), Some(0));

        assert_eq!(task_due_at(None).hours_remaining(now), None);
    }

    #[test]
    fn category_parsing_is_exact() {
        assert_eq!("Work".parse::<Category>(), Ok(Category::Work));
        assert_eq!("Learning".parse::<Category>(), Ok(Category::Learning));
        assert!("work".parse::<Category>().is_err());
        assert!("Chores".parse::<Category>().is_err());
    }

    #[test]
    fn category_defaults_to_other() {
        assert_eq!(Category::default(), Category::Other);
    }
}
