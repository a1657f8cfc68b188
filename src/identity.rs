//! Identity resolution and per-request sessions.
//!
//! External ids are role-prefixed strings (`doctor_…`, `patient_…`) used at
//! the system boundary. Nothing below this module joins on them; every
//! other component works with the internal numeric id returned here.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository;
use crate::error::ServiceError;
use crate::models::enums::Role;
use crate::models::{DoctorProfile, Identity};

/// The caller of one request, established once and passed explicitly to
/// everything that needs to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub role: Role,
    pub external_id: String,
    pub internal_id: i64,
    pub display_name: String,
}

impl Session {
    /// True when the session belongs to the given boundary identity.
    pub fn is_external(&self, external_id: &str, role: Role) -> bool {
        self.role == role && self.external_id == external_id
    }

    /// True when the session belongs to the given internal identity.
    pub fn is_internal(&self, internal_id: i64, role: Role) -> bool {
        self.role == role && self.internal_id == internal_id
    }
}

impl From<Identity> for Session {
    fn from(identity: Identity) -> Self {
        Self {
            role: identity.role,
            external_id: identity.external_id,
            internal_id: identity.internal_id,
            display_name: identity.display_name,
        }
    }
}

/// Resolve an external id to the internal id of the expected role.
///
/// Fails closed: an id carrying the other role's prefix, or one with no
/// row in the role's table, is `NotFound`.
pub fn resolve(conn: &Connection, external_id: &str, role: Role) -> Result<i64, ServiceError> {
    Ok(lookup(conn, external_id, role)?.internal_id)
}

/// Resolve the caller of a request into a [`Session`].
pub fn open_session(
    conn: &Connection,
    external_id: &str,
    role: Role,
) -> Result<Session, ServiceError> {
    let session = Session::from(lookup(conn, external_id, role)?);
    tracing::debug!(role = %session.role, internal_id = session.internal_id, "Session opened");
    Ok(session)
}

/// Display name of an internal identity.
pub fn display_name(conn: &Connection, internal_id: i64, role: Role) -> Result<String, ServiceError> {
    repository::get_display_name(conn, internal_id, role)?
        .ok_or_else(|| not_found(role))
}

/// Doctor directory, best rated first.
pub fn list_doctors(conn: &Connection) -> Result<Vec<DoctorProfile>, ServiceError> {
    Ok(repository::list_doctors(conn)?)
}

pub fn get_doctor(conn: &Connection, external_id: &str) -> Result<DoctorProfile, ServiceError> {
    repository::get_doctor_by_user_id(conn, external_id)?
        .ok_or_else(|| not_found(Role::Doctor))
}

fn lookup(conn: &Connection, external_id: &str, role: Role) -> Result<Identity, ServiceError> {
    if !has_role_prefix(external_id, role) {
        return Err(not_found(role));
    }
    repository::find_identity(conn, external_id, role)?.ok_or_else(|| not_found(role))
}

fn has_role_prefix(external_id: &str, role: Role) -> bool {
    external_id
        .strip_prefix(role.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|rest| !rest.is_empty())
}

fn not_found(role: Role) -> ServiceError {
    match role {
        Role::Doctor => ServiceError::NotFound("Doctor not found".into()),
        Role::Patient => ServiceError::NotFound("Patient not found".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::fixtures;

    #[test]
    fn resolves_matching_role() {
        let conn = open_memory_database().unwrap();
        let id = fixtures::patient(&conn, 7, "Patient Ahmed");
        assert_eq!(resolve(&conn, "patient_7", Role::Patient).unwrap(), id);
    }

    #[test]
    fn wrong_role_fails_closed() {
        let conn = open_memory_database().unwrap();
        fixtures::patient(&conn, 7, "Patient Ahmed");
        let err = resolve(&conn, "patient_7", Role::Doctor).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "Doctor not found");
    }

    #[test]
    fn unknown_id_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            resolve(&conn, "patient_404", Role::Patient),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn prefix_check() {
        assert!(has_role_prefix("doctor_3", Role::Doctor));
        assert!(!has_role_prefix("doctor_", Role::Doctor));
        assert!(!has_role_prefix("doctor3", Role::Doctor));
        assert!(!has_role_prefix("patient_3", Role::Doctor));
    }

    #[test]
    fn session_carries_identity() {
        let conn = open_memory_database().unwrap();
        let id = fixtures::doctor(&conn, 3, "Dr. Amira Mohamed");
        let session = open_session(&conn, "doctor_3", Role::Doctor).unwrap();

        assert_eq!(session.internal_id, id);
        assert_eq!(session.display_name, "Dr. Amira Mohamed");
        assert!(session.is_external("doctor_3", Role::Doctor));
        assert!(session.is_internal(id, Role::Doctor));
        assert!(!session.is_internal(id, Role::Patient));
    }

    #[test]
    fn doctor_directory() {
        let conn = open_memory_database().unwrap();
        fixtures::doctor(&conn, 1, "Dr. Moataz Bahaa");
        fixtures::doctor(&conn, 2, "Dr. Mark Phelopateer");

        assert_eq!(list_doctors(&conn).unwrap().len(), 2);
        assert_eq!(get_doctor(&conn, "doctor_2").unwrap().full_name, "Dr. Mark Phelopateer");
        assert!(get_doctor(&conn, "doctor_9").is_err());
        assert_eq!(display_name(&conn, 1, Role::Doctor).unwrap(), "Dr. Moataz Bahaa");
    }
}
