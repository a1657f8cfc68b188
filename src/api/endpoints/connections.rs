//! Connection request endpoints.
//!
//! - `POST /api/connections` — patient requests a doctor
//! - `GET /api/connections/patient/:user_id` — a patient's requests
//! - `GET /api/connections/doctor/:user_id` — requests addressed to a doctor
//! - `POST /api/connections/approve` — doctor approves or rejects

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::types::{ensure_caller, ApiContext};
use crate::connections::{self, Decision};
use crate::identity::Session;
use crate::models::enums::{ConnectionStatus, Role};
use crate::models::{ConnectionView, Outcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub patient_user_id: String,
    pub doctor_user_id: String,
    pub test_upload_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionResponse {
    pub success: bool,
    pub message: &'static str,
    pub connection_id: i64,
}

/// `POST /api/connections` — create a pending request.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiJson(req): ApiJson<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<CreateConnectionResponse>), ApiError> {
    ensure_caller(&session, &req.patient_user_id, Role::Patient)?;

    let conn = ctx.core.open_db()?;
    let connection_id = connections::create(
        &conn,
        &req.patient_user_id,
        &req.doctor_user_id,
        req.test_upload_id,
        req.notes.as_deref(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreateConnectionResponse {
            success: true,
            message: "Connection request sent successfully",
            connection_id,
        }),
    ))
}

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

impl StatusFilter {
    fn parse(&self) -> Result<Option<ConnectionStatus>, ApiError> {
        self.status
            .as_deref()
            .map(|s| {
                s.parse::<ConnectionStatus>()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid status filter '{s}'")))
            })
            .transpose()
    }
}

#[derive(Serialize)]
pub struct ConnectionsResponse {
    pub success: bool,
    pub connections: Vec<ConnectionView>,
}

/// `GET /api/connections/patient/:user_id` — requests made by a patient.
pub async fn for_patient(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiPath(user_id): ApiPath<String>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    ensure_caller(&session, &user_id, Role::Patient)?;
    let status = filter.parse()?;

    let conn = ctx.core.open_db()?;
    let connections = connections::list_for_patient(&conn, session.internal_id, status)?;
    Ok(Json(ConnectionsResponse {
        success: true,
        connections,
    }))
}

/// `GET /api/connections/doctor/:user_id` — requests addressed to a doctor.
pub async fn for_doctor(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiPath(user_id): ApiPath<String>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    ensure_caller(&session, &user_id, Role::Doctor)?;
    let status = filter.parse()?;

    let conn = ctx.core.open_db()?;
    let connections = connections::list_for_doctor(&conn, session.internal_id, status)?;
    Ok(Json(ConnectionsResponse {
        success: true,
        connections,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequest {
    pub connection_id: i64,
    pub status: String,
}

/// `POST /api/connections/approve` — the addressed doctor decides a request.
pub async fn decide(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiJson(req): ApiJson<DecideRequest>,
) -> Result<Json<Outcome>, ApiError> {
    let decision: Decision = req.status.parse()?;

    let conn = ctx.core.open_db()?;
    let connection = connections::get_connection(&conn, req.connection_id)?;
    if !session.is_internal(connection.doctor_id, Role::Doctor) {
        return Err(ApiError::Forbidden(
            "Only the addressed doctor may decide this request".into(),
        ));
    }

    let outcome = connections::decide(&conn, req.connection_id, decision)?;
    Ok(Json(outcome))
}
