use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::platform::models::SiteUser;
use crate::state::AppState;

/// GET /api/users - Registered site users, newest first
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<SiteUser>>, ApiError> {
    Ok(Json(state.records.list_site_users().await?))
}
