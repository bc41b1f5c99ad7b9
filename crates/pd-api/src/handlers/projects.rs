//! Project API handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use pd_core::traits::Id;
use pd_db::ProjectFilter;
use pd_models::{CreateProject, Project, ProjectStatus, Task, UpdateProject};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<ProjectStatus>,
}

impl From<ProjectQuery> for ProjectFilter {
    fn from(query: ProjectQuery) -> Self {
        ProjectFilter {
            status: query.status,
            ..Default::default()
        }
    }
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<ProjectQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list(&user, query.into()).await?))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.projects.get(&user, id).await?))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreateProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.projects.create(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    ApiJson(dto): ApiJson<UpdateProject>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.projects.update(&user, id, dto).await?))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<StatusCode> {
    state.projects.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/projects/:id/tasks
pub async fn list_project_tasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.projects.tasks(&user, id).await?))
}
