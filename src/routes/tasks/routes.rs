use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{CreateTaskRequest, ListTasksQuery, TaskResponse, UpdateTaskRequest};
use super::service;
use crate::error::ApiError;
use crate::routes::middleware_auth::JwtUser;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Json(body): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = service::create(&state.tasks, user_id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse::from_task(task, Utc::now())),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Query(query): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = service::list(&state.tasks, user_id, query).await?;
    let now = Utc::now();
    let body: Vec<TaskResponse> = tasks
        .into_iter()
        .map(|t| TaskResponse::from_task(t, now))
        .collect();
    Ok(Json(body))
}

pub async fn due_soon(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = service::list_due_soon(&state.tasks, user_id).await?;
    Ok(Json(tasks))
}

pub async fn get(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = service::get(&state.tasks, id, user_id).await?;
    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}

pub async fn update(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = service::update(&state.tasks, id, user_id, body).await?;
    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}

pub async fn delete(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = service::remove(&state.tasks, id, user_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Task deleted",
        "task": TaskResponse::from_task(task, Utc::now()),
    })))
}

pub async fn toggle(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = service::toggle_completion(&state.tasks, id, user_id).await?;
    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}
