//! Doctor directory endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::ApiPath;
use crate::api::types::ApiContext;
use crate::identity::{self, Session};
use crate::models::DoctorProfile;

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub success: bool,
    pub doctors: Vec<DoctorProfile>,
}

/// `GET /api/doctors` — all doctors, best rated first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_session): Extension<Session>,
) -> Result<Json<DoctorsResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let doctors = identity::list_doctors(&conn)?;
    Ok(Json(DoctorsResponse {
        success: true,
        doctors,
    }))
}

#[derive(Serialize)]
pub struct DoctorResponse {
    pub success: bool,
    pub doctor: DoctorProfile,
}

/// `GET /api/doctors/:user_id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(_session): Extension<Session>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<DoctorResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let doctor = identity::get_doctor(&conn, &user_id)?;
    Ok(Json(DoctorResponse {
        success: true,
        doctor,
    }))
}
