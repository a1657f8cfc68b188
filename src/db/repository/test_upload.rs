use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, parse_timestamp, DatabaseError};
use crate::models::enums::*;
use crate::models::*;

pub fn insert_test_upload(
    conn: &Connection,
    patient_id: i64,
    test_type: TestType,
    meta: &FileMeta,
    upload_date: &NaiveDateTime,
    notes: Option<&str>,
) -> Result<i64, DatabaseError> {
    let file_size = i64::try_from(meta.file_size)
        .map_err(|_| DatabaseError::ConstraintViolation("file size out of range".into()))?;

    conn.execute(
        "INSERT INTO test_uploads
         (patient_id, test_type, file_type, file_name, file_path, file_size, upload_date, status, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            patient_id,
            test_type.as_str(),
            FileType::from_file_name(&meta.file_name).as_str(),
            meta.file_name,
            meta.file_path,
            file_size,
            format_timestamp(upload_date),
            UploadStatus::Pending.as_str(),
            notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const UPLOAD_COLUMNS: &str = "id, patient_id, test_type, file_type, file_name, file_path,
                              file_size, upload_date, status, notes";

pub fn get_test_upload(conn: &Connection, id: i64) -> Result<Option<TestUpload>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {UPLOAD_COLUMNS} FROM test_uploads WHERE id = ?1"),
            params![id],
            upload_row,
        )
        .optional()?;

    row.map(upload_from_row).transpose()
}

pub fn list_test_uploads_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<TestUpload>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {UPLOAD_COLUMNS} FROM test_uploads
         WHERE patient_id = ?1 ORDER BY upload_date DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id], upload_row)?;

    let mut uploads = Vec::new();
    for row in rows {
        uploads.push(upload_from_row(row?)?);
    }
    Ok(uploads)
}

struct UploadRow {
    id: i64,
    patient_id: i64,
    test_type: String,
    file_type: String,
    file_name: String,
    file_path: String,
    file_size: i64,
    upload_date: String,
    status: String,
    notes: Option<String>,
}

fn upload_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UploadRow> {
    Ok(UploadRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        test_type: row.get(2)?,
        file_type: row.get(3)?,
        file_name: row.get(4)?,
        file_path: row.get(5)?,
        file_size: row.get(6)?,
        upload_date: row.get(7)?,
        status: row.get(8)?,
        notes: row.get(9)?,
    })
}

fn upload_from_row(row: UploadRow) -> Result<TestUpload, DatabaseError> {
    Ok(TestUpload {
        id: row.id,
        patient_id: row.patient_id,
        test_type: TestType::from_str(&row.test_type)?,
        file_type: FileType::from_str(&row.file_type)?,
        file_name: row.file_name,
        file_path: row.file_path,
        file_size: u64::try_from(row.file_size)
            .map_err(|_| DatabaseError::ConstraintViolation("negative file size".into()))?,
        upload_date: parse_timestamp(&row.upload_date)?,
        status: UploadStatus::from_str(&row.status)?,
        notes: row.notes,
    })
}
