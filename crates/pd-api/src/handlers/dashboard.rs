use axum::{extract::State, Json};
use chrono::Utc;
use pd_services::DashboardStats;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<DashboardStats>> {
    let today = Utc::now().date_naive();
    Ok(Json(DashboardStats::load(state.store.as_ref(), &user, today).await?))
}
