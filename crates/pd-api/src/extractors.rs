//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use pd_auth::{extract_bearer_token, JwtService, Session};
use pd_core::config::AuthConfig;
use pd_db::EntityStore;
use pd_services::{ProjectService, TaskService, UserService};
use tracing::debug;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub jwt: Arc<JwtService>,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub users: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, auth: &AuthConfig) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(
                auth.jwt_secret.as_bytes(),
                auth.token_expiration_seconds,
            )),
            projects: ProjectService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            users: UserService::new(store.clone(), auth.password_min_length),
            store,
        }
    }
}

/// The caller's session, rebuilt from a bearer token
pub struct AuthenticatedUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let session = app_state.jwt.session(token)?;
        debug!(user_id = session.user_id, role = %session.role, "request authenticated");
        Ok(AuthenticatedUser(session))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = Session;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// JSON body whose parse failures come back as API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; a malformed id is a 400 with the usual error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string with the same error handling as [`ApiPath`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
