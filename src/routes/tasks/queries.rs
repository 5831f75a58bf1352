use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{Category, Task};
use crate::error::ApiError;

/// One message for "does not exist" and "exists but belongs to someone else".
pub const TASK_NOT_FOUND: &str = "Task not found or not authorized";

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub category: Option<Category>,
    /// Inclusive upper bound on deadline; tasks without a deadline never match.
    pub due_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub deadline: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
}

/// Persistence seam for tasks. Every read, update and delete is scoped by
/// `(task_id, owner_id)` — the single ownership-isolation enforcement point,
/// so a task of user A is unreachable by requests authenticated as user B.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, owner_id: Uuid, task: NewTask) -> Result<Task, ApiError>;

    /// Owner's tasks matching `filter`, newest-created-first.
    async fn find_many(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, ApiError>;

    async fn find_one(&self, task_id: Uuid, owner_id: Uuid) -> Result<Task, ApiError>;

    /// Partial update; absent fields keep their stored value, `updated_at` is
    /// refreshed.
    async fn update_fields(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, ApiError>;

    /// Removes the task and returns the deleted row.
    async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<Task, ApiError>;

    /// Incomplete tasks with a deadline in the closed interval `[from, to]`,
    /// soonest-deadline-first.
    async fn find_due_between(
        &self,
        owner_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>, ApiError>;
}

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, owner_id: Uuid, task: NewTask) -> Result<Task, ApiError> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, user_id, title, description, category, deadline)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, description, category, deadline, completed, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.category)
        .bind(task.deadline)
        .fetch_one(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn find_many(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, category, deadline, completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND ($2::task_category IS NULL OR category = $2)
              AND ($3::timestamptz IS NULL OR deadline <= $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(filter.category)
        .bind(filter.due_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(rec)
    }

    async fn find_one(&self, task_id: Uuid, owner_id: Uuid) -> Result<Task, ApiError> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, category, deadline, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
    }

    async fn update_fields(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, ApiError> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                deadline = COALESCE($6, deadline),
                completed = COALESCE($7, completed),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, category, deadline, completed, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.category)
        .bind(patch.deadline)
        .bind(patch.completed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
    }

    async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<Task, ApiError> {
        sqlx::query_as::<_, Task>(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, category, deadline, completed, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound(TASK_NOT_FOUND))
    }

    async fn find_due_between(
        &self,
        owner_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Task>, ApiError> {
        let rec = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, category, deadline, completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND completed = FALSE
              AND deadline >= $2
              AND deadline <= $3
            ORDER BY deadline ASC
            "#,
        )
        .bind(owner_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rec)
    }
}
