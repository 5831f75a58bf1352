use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::dto::{
    CreateTaskRequest, DueSoonTaskResponse, ListTasksQuery, TaskResponse, UpdateTaskRequest,
};
use super::model::{Category, Task, DUE_SOON_WINDOW_HOURS};
use super::queries::{NewTask, TaskFilter, TaskPatch, TaskRepository};
use crate::error::ApiError;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

fn validate_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::InvalidInput("Title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::InvalidInput(
            "Title cannot exceed 100 characters".into(),
        ));
    }
    Ok(title.to_string())
}

fn validate_description(raw: &str) -> Result<String, ApiError> {
    let description = raw.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::InvalidInput(
            "Description cannot exceed 500 characters".into(),
        ));
    }
    Ok(description.to_string())
}

/// The repository trusts its callers here: category strings are checked
/// against the closed set before they reach a query. Empty means absent.
fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|()| {
            ApiError::InvalidInput("Category must be one of Work, Personal, Learning, Other".into())
        }),
    }
}

fn parse_timestamp(raw: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| {
                ApiError::InvalidInput(format!("{field} must be an RFC 3339 timestamp"))
            }),
    }
}

pub async fn create<R: TaskRepository>(
    repo: &R,
    owner_id: Uuid,
    req: CreateTaskRequest,
) -> Result<Task, ApiError> {
    let title = match req.title.as_deref() {
        Some(t) => validate_title(t)?,
        None => return Err(ApiError::InvalidInput("Title is required".into())),
    };
    let description = match req.description.as_deref() {
        Some(d) => Some(validate_description(d)?),
        None => None,
    };
    let category = parse_category(req.category.as_deref())?.unwrap_or_default();
    let deadline = parse_timestamp(req.deadline.as_deref(), "deadline")?;

    repo.insert(
        owner_id,
        NewTask {
            title,
            description,
            category,
            deadline,
        },
    )
    .await
}

pub async fn list<R: TaskRepository>(
    repo: &R,
    owner_id: Uuid,
    query: ListTasksQuery,
) -> Result<Vec<Task>, ApiError> {
    let filter = TaskFilter {
        category: parse_category(query.category.as_deref())?,
        due_before: parse_timestamp(query.due_before.as_deref(), "dueBefore")?,
    };
    repo.find_many(owner_id, &filter).await
}

pub async fn get<R: TaskRepository>(
    repo: &R,
    task_id: Uuid,
    owner_id: Uuid,
) -> Result<Task, ApiError> {
    repo.find_one(task_id, owner_id).await
}

pub async fn update<R: TaskRepository>(
    repo: &R,
    task_id: Uuid,
    owner_id: Uuid,
    req: UpdateTaskRequest,
) -> Result<Task, ApiError> {
    let title = match req.title.as_deref() {
        Some(t) => Some(validate_title(t)?),
        None => None,
    };
    let description = match req.description.as_deref() {
        Some(d) => Some(validate_description(d)?),
        None => None,
    };
    let patch = TaskPatch {
        title,
        description,
        category: parse_category(req.category.as_deref())?,
        deadline: parse_timestamp(req.deadline.as_deref(), "deadline")?,
        completed: req.completed,
    };
    repo.update_fields(task_id, owner_id, patch).await
}

pub async fn remove<R: TaskRepository>(
    repo: &R,
    task_id: Uuid,
    owner_id: Uuid,
) -> Result<Task, ApiError> {
    repo.delete(task_id, owner_id).await
}

/// Read-modify-write in two store round-trips; two concurrent toggles on the
/// same task can lose an update.
pub async fn toggle_completion<R: TaskRepository>(
    repo: &R,
    task_id: Uuid,
    owner_id: Uuid,
) -> Result<Task, ApiError> {
    let task = repo.find_one(task_id, owner_id).await?;
    repo.update_fields(
        task_id,
        owner_id,
        TaskPatch {
            completed: Some(!task.completed),
            ..TaskPatch::default()
        },
    )
    .await
}

/// Incomplete tasks with a deadline in `[now, now + 24h]`, soonest first.
/// `now` is captured once so every `hoursRemaining` in the listing is
/// computed against the same instant.
pub async fn list_due_soon<R: TaskRepository>(
    repo: &R,
    owner_id: Uuid,
) -> Result<Vec<DueSoonTaskResponse>, ApiError> {
    let now = Utc::now();
    let window_end = now + Duration::hours(DUE_SOON_WINDOW_HOURS);

    let tasks = repo.find_due_between(owner_id, now, window_end).await?;

    Ok(tasks
        .into_iter()
        .map(|task| {
            let hours_remaining = task.hours_remaining(now).unwrap_or(0);
            DueSoonTaskResponse {
                task: TaskResponse::from_task(task, now),
                hours_remaining,
            }
        })
        .collect())
}
