//! Registration and login

use axum::{extract::State, http::StatusCode, Json};
use pd_models::{RegisterUser, User};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{ApiJson, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<RegisterUser>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state.users.register(dto).await?;
    let token = state.jwt.create_token(&user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<LoginDto>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state.users.login(&dto.email, &dto.password).await?;
    let token = state.jwt.create_token(&user)?;
    Ok(Json(AuthResponse { user, token }))
}
