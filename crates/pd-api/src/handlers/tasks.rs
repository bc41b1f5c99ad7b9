//! Task API handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use pd_core::traits::Id;
use pd_db::TaskFilter;
use pd_models::{CreateTask, Priority, Task, TaskStatus, TaskUpdate};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub project_id: Option<Id>,
    pub assigned_to: Option<Id>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl From<TaskQuery> for TaskFilter {
    fn from(query: TaskQuery) -> Self {
        TaskFilter {
            project_id: query.project_id,
            assigned_to: query.assigned_to,
            status: query.status,
            priority: query.priority,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusDto {
    pub status: TaskStatus,
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list(&user, query.into()).await?))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get(&user, id).await?))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    ApiJson(dto): ApiJson<TaskUpdate>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.update(&user, id, dto).await?))
}

/// PATCH /api/tasks/:id/status
pub async fn update_task_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    ApiJson(dto): ApiJson<StatusDto>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.update_status(&user, id, dto.status).await?))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
