use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, parse_timestamp, DatabaseError};
use crate::models::enums::*;
use crate::models::*;

/// Insert a pending connection request.
///
/// A second row for the same `(patient_id, doctor_id)` pair fails on the
/// table's UNIQUE constraint; callers detect it with
/// [`DatabaseError::is_unique_violation`].
pub fn insert_connection(
    conn: &Connection,
    patient_id: i64,
    doctor_id: i64,
    test_upload_id: Option<i64>,
    notes: Option<&str>,
    request_date: &NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO doctor_patient_connections
         (patient_id, doctor_id, status, request_date, test_upload_id, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient_id,
            doctor_id,
            ConnectionStatus::Pending.as_str(),
            format_timestamp(request_date),
            test_upload_id,
            notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_connection(
    conn: &Connection,
    id: i64,
) -> Result<Option<ConnectionRequest>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, doctor_id, status, request_date, approval_date,
                    test_upload_id, notes
             FROM doctor_patient_connections WHERE id = ?1",
            params![id],
            |row| {
                Ok(ConnectionRow {
                    id: row.get(0)?,
                    patient_id: row.get(1)?,
                    doctor_id: row.get(2)?,
                    status: row.get(3)?,
                    request_date: row.get(4)?,
                    approval_date: row.get(5)?,
                    test_upload_id: row.get(6)?,
                    notes: row.get(7)?,
                })
            },
        )
        .optional()?;

    row.map(connection_from_row).transpose()
}

/// Move a connection out of `pending`. Returns the number of rows changed,
/// which is 0 when the connection was already decided.
pub fn update_connection_status(
    conn: &Connection,
    id: i64,
    status: ConnectionStatus,
    approval_date: &NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctor_patient_connections
         SET status = ?1, approval_date = ?2
         WHERE id = ?3 AND status = ?4",
        params![
            status.as_str(),
            format_timestamp(approval_date),
            id,
            ConnectionStatus::Pending.as_str(),
        ],
    )?;
    Ok(changed)
}

const LIST_FOR_PATIENT: &str = "
    SELECT c.id, c.patient_id, p.full_name, c.doctor_id, d.full_name,
           c.status, c.request_date, c.approval_date, c.test_upload_id, c.notes
    FROM doctor_patient_connections c
    JOIN patients p ON c.patient_id = p.id
    JOIN doctors d ON c.doctor_id = d.id
    WHERE c.patient_id = ?1 AND (?2 IS NULL OR c.status = ?2)
    ORDER BY c.request_date DESC, c.id DESC";

const LIST_FOR_DOCTOR: &str = "
    SELECT c.id, c.patient_id, p.full_name, c.doctor_id, d.full_name,
           c.status, c.request_date, c.approval_date, c.test_upload_id, c.notes
    FROM doctor_patient_connections c
    JOIN patients p ON c.patient_id = p.id
    JOIN doctors d ON c.doctor_id = d.id
    WHERE c.doctor_id = ?1 AND (?2 IS NULL OR c.status = ?2)
    ORDER BY c.request_date DESC, c.id DESC";

/// Connections where `party_id` holds `party_role`, newest request first.
pub fn list_connection_views(
    conn: &Connection,
    party_id: i64,
    party_role: Role,
    status: Option<ConnectionStatus>,
) -> Result<Vec<ConnectionView>, DatabaseError> {
    let sql = match party_role {
        Role::Patient => LIST_FOR_PATIENT,
        Role::Doctor => LIST_FOR_DOCTOR,
    };
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt.query_map(params![party_id, status.map(|s| s.as_str())], |row| {
        Ok(ConnectionViewRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_name: row.get(2)?,
            doctor_id: row.get(3)?,
            doctor_name: row.get(4)?,
            status: row.get(5)?,
            request_date: row.get(6)?,
            approval_date: row.get(7)?,
            test_upload_id: row.get(8)?,
            notes: row.get(9)?,
        })
    })?;

    let mut views = Vec::new();
    for row in rows {
        views.push(view_from_row(row?)?);
    }
    Ok(views)
}

pub fn count_connections(
    conn: &Connection,
    party_id: i64,
    party_role: Role,
    status: ConnectionStatus,
) -> Result<u32, DatabaseError> {
    let sql = match party_role {
        Role::Patient => {
            "SELECT COUNT(*) FROM doctor_patient_connections WHERE patient_id = ?1 AND status = ?2"
        }
        Role::Doctor => {
            "SELECT COUNT(*) FROM doctor_patient_connections WHERE doctor_id = ?1 AND status = ?2"
        }
    };
    let count = conn.query_row(sql, params![party_id, status.as_str()], |row| {
        row.get::<_, u32>(0)
    })?;
    Ok(count)
}

struct ConnectionRow {
    id: i64,
    patient_id: i64,
    doctor_id: i64,
    status: String,
    request_date: String,
    approval_date: Option<String>,
    test_upload_id: Option<i64>,
    notes: Option<String>,
}

struct ConnectionViewRow {
    id: i64,
    patient_id: i64,
    patient_name: String,
    doctor_id: i64,
    doctor_name: String,
    status: String,
    request_date: String,
    approval_date: Option<String>,
    test_upload_id: Option<i64>,
    notes: Option<String>,
}

fn connection_from_row(row: ConnectionRow) -> Result<ConnectionRequest, DatabaseError> {
    Ok(ConnectionRequest {
        id: row.id,
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        status: ConnectionStatus::from_str(&row.status)?,
        request_date: parse_timestamp(&row.request_date)?,
        approval_date: row.approval_date.as_deref().map(parse_timestamp).transpose()?,
        test_upload_id: row.test_upload_id,
        notes: row.notes,
    })
}

fn view_from_row(row: ConnectionViewRow) -> Result<ConnectionView, DatabaseError> {
    Ok(ConnectionView {
        id: row.id,
        patient_id: row.patient_id,
        patient_name: row.patient_name,
        doctor_id: row.doctor_id,
        doctor_name: row.doctor_name,
        status: ConnectionStatus::from_str(&row.status)?,
        request_date: parse_timestamp(&row.request_date)?,
        approval_date: row.approval_date.as_deref().map(parse_timestamp).transpose()?,
        test_upload_id: row.test_upload_id,
        notes: row.notes,
    })
}
