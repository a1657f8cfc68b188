use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository;
use crate::error::ServiceError;
use crate::identity::Session;
use crate::models::enums::ConnectionStatus;

/// Counters shown on a user's home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub pending_requests: u32,
    pub approved_connections: u32,
    pub rooms: u32,
    pub unread_messages: u32,
}

pub fn summary(conn: &Connection, session: &Session) -> Result<DashboardSummary, ServiceError> {
    let (id, role) = (session.internal_id, session.role);
    Ok(DashboardSummary {
        pending_requests: repository::count_connections(conn, id, role, ConnectionStatus::Pending)?,
        approved_connections: repository::count_connections(
            conn,
            id,
            role,
            ConnectionStatus::Approved,
        )?,
        rooms: repository::count_rooms(conn, id, role)?,
        unread_messages: repository::count_unread_for(conn, id, role)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat;
    use crate::connections::{self, Decision};
    use crate::db::open_memory_database;
    use crate::db::repository::fixtures;
    use crate::identity::open_session;
    use crate::models::enums::Role;
    use crate::models::NewMessage;

    #[test]
    fn empty_for_new_user() {
        let conn = open_memory_database().unwrap();
        fixtures::patient(&conn, 1, "Patient Ahmed");
        let session = open_session(&conn, "patient_1", Role::Patient).unwrap();

        let s = summary(&conn, &session).unwrap();
        assert_eq!(
            s,
            DashboardSummary {
                pending_requests: 0,
                approved_connections: 0,
                rooms: 0,
                unread_messages: 0,
            }
        );
    }

    #[test]
    fn counts_follow_the_viewer() {
        let conn = open_memory_database().unwrap();
        let doctor = fixtures::doctor(&conn, 3, "Dr. Amira Mohamed");
        let patient = fixtures::patient(&conn, 1, "Patient Ahmed");
        fixtures::patient(&conn, 2, "Patient Sara");

        let approved = connections::create(&conn, "patient_1", "doctor_3", None, Some("hello")).unwrap();
        connections::create(&conn, "patient_2", "doctor_3", None, None).unwrap();
        connections::decide(&conn, approved, Decision::Approve).unwrap();
        chat::send_message(
            &conn,
            &NewMessage {
                room_id: chat::room_id_for(doctor, patient),
                sender_id: doctor,
                sender_type: Role::Doctor,
                receiver_id: patient,
                receiver_type: Role::Patient,
                message: "Results look normal".into(),
            },
        )
        .unwrap();

        let doc = open_session(&conn, "doctor_3", Role::Doctor).unwrap();
        let s = summary(&conn, &doc).unwrap();
        assert_eq!(s.pending_requests, 1);
        assert_eq!(s.approved_connections, 1);
        assert_eq!(s.rooms, 1);
        // The seeded notes
        assert_eq!(s.unread_messages, 1);

        let pat = open_session(&conn, "patient_1", Role::Patient).unwrap();
        let s = summary(&conn, &pat).unwrap();
        assert_eq!(s.pending_requests, 0);
        assert_eq!(s.approved_connections, 1);
        assert_eq!(s.rooms, 1);
        assert_eq!(s.unread_messages, 1);
    }
}
