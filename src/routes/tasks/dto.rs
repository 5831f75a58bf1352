use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Category, Task};

/// Create/update bodies carry category and deadline as raw strings; the
/// lifecycle service parses and validates them so every rejection is a 400.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub deadline: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub deadline: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub category: Option<String>,
    pub due_before: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_due_soon: bool,
    pub is_overdue: bool,
}

impl TaskResponse {
    /// Stored fields plus the virtuals, computed against `now` at the
    /// serialization boundary and never persisted.
    pub fn from_task(task: Task, now: DateTime<Utc>) -> Self {
        let is_due_soon = task.is_due_soon(now);
        let is_overdue = task.is_overdue(now);
        Self {
            id: task.id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            category: task.category,
            deadline: task.deadline,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
            is_due_soon,
            is_overdue,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueSoonTaskResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    pub hours_remaining: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stored_task(deadline: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: None,
            category: Category::Personal,
            deadline,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn response_without_deadline_has_no_virtual_flags() {
        let now = Utc::now();
        let resp = TaskResponse::from_task(stored_task(None), now);
        assert!(!resp.is_due_soon);
        assert!(!resp.is_overdue);
    }

    #[test]
    fn response_serializes_camel_case_with_virtuals() {
        let now = Utc::now();
        let resp = TaskResponse::from_task(stored_task(Some(now + Duration::hours(2))), now);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["isDueSoon"], true);
        assert_eq!(json["isOverdue"], false);
        assert_eq!(json["category"], "Personal");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn due_soon_response_flattens_task_fields() {
        let now = Utc::now();
        let resp = DueSoonTaskResponse {
            task: TaskResponse::from_task(stored_task(Some(now + Duration::hours(3))), now),
            hours_remaining: 3,
        };
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["hoursRemaining"], 3);
        assert_eq!(json["title"], "Buy milk");
    }
}
