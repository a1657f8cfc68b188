//! Doctor–patient connection requests.
//!
//! Lifecycle: a patient creates a request (`pending`); the doctor decides it
//! once, to `approved` or `rejected`. Both decisions are terminal. Approval
//! provisions the pair's chat room and, when the request carried notes,
//! replays them as the patient's first message — all in the transaction
//! that flips the status.

use std::str::FromStr;

use rusqlite::Connection;

use crate::chat;
use crate::db::{self, repository};
use crate::error::ServiceError;
use crate::identity;
use crate::models::enums::{ConnectionStatus, Role};
use crate::models::{ConnectionRequest, ConnectionView, Outcome};

/// A doctor's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(&self) -> ConnectionStatus {
        match self {
            Decision::Approve => ConnectionStatus::Approved,
            Decision::Reject => ConnectionStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = ServiceError;

    /// Accepts the wire values `approved` and `rejected`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Decision::Approve),
            "rejected" => Ok(Decision::Reject),
            other => Err(ServiceError::Validation(format!(
                "Invalid status '{other}': expected 'approved' or 'rejected'"
            ))),
        }
    }
}

/// Create a pending request from a patient to a doctor.
///
/// The duplicate check is the `(patient_id, doctor_id)` unique index: two
/// concurrent requests for the same pair produce one row and one `Conflict`.
pub fn create(
    conn: &Connection,
    patient_external_id: &str,
    doctor_external_id: &str,
    test_upload_id: Option<i64>,
    notes: Option<&str>,
) -> Result<i64, ServiceError> {
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    if let Some(notes) = notes {
        if notes.chars().count() > chat::MAX_MESSAGE_CHARS {
            return Err(ServiceError::Validation(format!(
                "Notes too long (max {} chars)",
                chat::MAX_MESSAGE_CHARS
            )));
        }
    }

    let tx = db::begin_immediate(conn)?;
    let patient_id = identity::resolve(&tx, patient_external_id, Role::Patient)?;
    let doctor_id = identity::resolve(&tx, doctor_external_id, Role::Doctor)?;

    if let Some(upload_id) = test_upload_id {
        let upload = repository::get_test_upload(&tx, upload_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Test upload {upload_id} not found")))?;
        if upload.patient_id != patient_id {
            return Err(ServiceError::Validation(
                "Test upload belongs to a different patient".into(),
            ));
        }
    }

    let request_date = db::now_utc();
    let connection_id = match repository::insert_connection(
        &tx,
        patient_id,
        doctor_id,
        test_upload_id,
        notes,
        &request_date,
    ) {
        Ok(id) => id,
        Err(e) if e.is_unique_violation() => {
            tracing::info!(patient_id, doctor_id, "Duplicate connection request rejected");
            return Err(ServiceError::Conflict("Connection request already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };
    tx.commit()?;

    tracing::info!(connection_id, patient_id, doctor_id, ?test_upload_id, "Connection requested");
    Ok(connection_id)
}

/// Apply a doctor's decision to a pending request.
///
/// Deciding a request that is no longer pending is a `Conflict`; nothing is
/// re-applied.
pub fn decide(
    conn: &Connection,
    connection_id: i64,
    decision: Decision,
) -> Result<Outcome, ServiceError> {
    let tx = db::begin_immediate(conn)?;
    let request = get_connection(&tx, connection_id)?;
    if request.status.is_terminal() {
        return Err(ServiceError::Conflict(format!(
            "Connection {connection_id} is already {}",
            request.status
        )));
    }

    let status = decision.status();
    let changed = repository::update_connection_status(&tx, connection_id, status, &db::now_utc())?;
    if changed != 1 {
        return Err(ServiceError::Conflict(format!(
            "Connection {connection_id} is no longer pending"
        )));
    }

    if decision == Decision::Approve {
        let room = chat::ensure_room(&tx, request.doctor_id, request.patient_id, Some(connection_id))?;
        if let Some(notes) = request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            chat::seed_within(&tx, &room, notes)?;
        }
    }
    tx.commit()?;

    tracing::info!(connection_id, status = %status, "Connection decided");
    Ok(Outcome::ok(format!("Connection {status} successfully")))
}

pub fn get_connection(conn: &Connection, connection_id: i64) -> Result<ConnectionRequest, ServiceError> {
    repository::get_connection(conn, connection_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Connection {connection_id} not found")))
}

/// A patient's requests, newest first.
pub fn list_for_patient(
    conn: &Connection,
    patient_id: i64,
    status: Option<ConnectionStatus>,
) -> Result<Vec<ConnectionView>, ServiceError> {
    Ok(repository::list_connection_views(conn, patient_id, Role::Patient, status)?)
}

/// Requests addressed to a doctor, newest first.
pub fn list_for_doctor(
    conn: &Connection,
    doctor_id: i64,
    status: Option<ConnectionStatus>,
) -> Result<Vec<ConnectionView>, ServiceError> {
    Ok(repository::list_connection_views(conn, doctor_id, Role::Doctor, status)?)
}
