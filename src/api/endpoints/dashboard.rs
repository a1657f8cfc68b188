//! Dashboard endpoint.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard::{self, DashboardSummary};
use crate::identity::Session;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub success: bool,
    pub display_name: String,
    pub summary: DashboardSummary,
}

/// `GET /api/dashboard` — counters for the caller.
pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let summary = dashboard::summary(&conn, &session)?;
    Ok(Json(DashboardResponse {
        success: true,
        display_name: session.display_name,
        summary,
    }))
}
