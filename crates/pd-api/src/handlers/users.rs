//! User API handlers

use axum::{extract::State, http::StatusCode, Json};
use pd_core::traits::Id;
use pd_models::{RegisterUser, UpdateUser, User};

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiPath, AppState, AuthenticatedUser};

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list(&user).await?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get(&user, id).await?))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(dto): ApiJson<RegisterUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let created = state.users.create(&user, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
    ApiJson(dto): ApiJson<UpdateUser>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.update(&user, id, dto).await?))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<Id>,
) -> ApiResult<StatusCode> {
    state.users.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
