//! Test upload endpoints.
//!
//! The client transfers file bytes to storage separately; these routes
//! record and list the metadata.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{ensure_caller, ApiContext};
use crate::identity::Session;
use crate::models::enums::{Role, TestType};
use crate::models::{FileMeta, TestUpload};
use crate::uploads;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUploadRequest {
    pub patient_user_id: String,
    pub test_type: String,
    pub file_name: String,
    pub file_size: u64,
    pub notes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordUploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub upload_id: i64,
    pub file_name: String,
}

/// `POST /api/uploads` — record a patient's test upload.
pub async fn record(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiJson(req): ApiJson<RecordUploadRequest>,
) -> Result<(StatusCode, Json<RecordUploadResponse>), ApiError> {
    ensure_caller(&session, &req.patient_user_id, Role::Patient)?;
    let test_type: TestType = req
        .test_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid test type '{}'", req.test_type)))?;
    if req.file_name.trim().is_empty() {
        return Err(ApiError::BadRequest("File name cannot be empty".into()));
    }

    let stored_name = uploads::stored_file_name(&req.file_name);
    let meta = FileMeta {
        file_path: ctx.core.upload_path(&stored_name).to_string_lossy().into_owned(),
        file_name: stored_name,
        file_size: req.file_size,
    };

    let conn = ctx.core.open_db()?;
    let upload_id = uploads::record_upload(
        &conn,
        session.internal_id,
        test_type,
        &meta,
        req.notes.as_deref(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(RecordUploadResponse {
            success: true,
            message: "Test uploaded successfully",
            upload_id,
            file_name: meta.file_name,
        }),
    ))
}

#[derive(Serialize)]
pub struct UploadsResponse {
    pub success: bool,
    pub uploads: Vec<TestUpload>,
}

/// `GET /api/uploads/patient/:user_id` — a patient's uploads, newest first.
pub async fn for_patient(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<UploadsResponse>, ApiError> {
    ensure_caller(&session, &user_id, Role::Patient)?;

    let conn = ctx.core.open_db()?;
    let uploads = uploads::list_for_patient(&conn, session.internal_id)?;
    Ok(Json(UploadsResponse {
        success: true,
        uploads,
    }))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub upload: TestUpload,
}

/// `GET /api/uploads/:upload_id` — one upload, visible to its patient only.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiPath(upload_id): ApiPath<i64>,
) -> Result<Json<UploadResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let upload = uploads::get_upload(&conn, upload_id)?;
    if !session.is_internal(upload.patient_id, Role::Patient) {
        return Err(ApiError::Forbidden("Caller may only view their own uploads".into()));
    }
    Ok(Json(UploadResponse {
        success: true,
        upload,
    }))
}
