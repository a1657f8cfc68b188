//! Test upload metadata. File bytes live in external storage; this module
//! records what was stored so a connection request can point at it.

use rusqlite::Connection;

use crate::db::{self, repository};
use crate::error::ServiceError;
use crate::models::enums::TestType;
use crate::models::{FileMeta, TestUpload};

/// Record a new upload for a patient. The upload starts out `pending`.
pub fn record_upload(
    conn: &Connection,
    patient_id: i64,
    test_type: TestType,
    meta: &FileMeta,
    notes: Option<&str>,
) -> Result<i64, ServiceError> {
    if meta.file_name.trim().is_empty() {
        return Err(ServiceError::Validation("File name cannot be empty".into()));
    }
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());

    let upload_id =
        repository::insert_test_upload(conn, patient_id, test_type, meta, &db::now_utc(), notes)?;

    tracing::info!(
        upload_id,
        patient_id,
        test_type = %test_type,
        file_size = meta.file_size,
        "Test upload recorded"
    );
    Ok(upload_id)
}

pub fn list_for_patient(conn: &Connection, patient_id: i64) -> Result<Vec<TestUpload>, ServiceError> {
    Ok(repository::list_test_uploads_by_patient(conn, patient_id)?)
}

pub fn get_upload(conn: &Connection, upload_id: i64) -> Result<TestUpload, ServiceError> {
    repository::get_test_upload(conn, upload_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Test upload {upload_id} not found")))
}

/// Name under which an uploaded file is stored: a random prefix keeps two
/// uploads of `results.pdf` from colliding.
pub fn stored_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    format!("{}_{}", uuid::Uuid::new_v4(), base)
}
