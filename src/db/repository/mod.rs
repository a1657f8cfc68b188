//! Repository layer — entity-scoped database operations.
//!
//! Every function takes a borrowed `rusqlite::Connection` (or a
//! `Transaction`, which derefs to one) so callers decide the transaction
//! boundary. All values are bound as parameters.

mod chat_message;
mod chat_room;
mod connection;
mod identity;
mod test_upload;

pub use chat_message::*;
pub use chat_room::*;
pub use connection::*;
pub use identity::*;
pub use test_upload::*;


#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::fixtures;
    use super::*;
    use crate::db::{now_utc, open_memory_database, DatabaseError};
    use crate::models::enums::*;
    use crate::models::*;
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn message(room_id: &str, sender: (i64, Role), receiver: (i64, Role), text: &str) -> NewMessage {
        NewMessage {
            room_id: room_id.into(),
            sender_id: sender.0,
            sender_type: sender.1,
            receiver_id: receiver.0,
            receiver_type: receiver.1,
            message: text.into(),
        }
    }

    #[test]
    fn identity_lookup_is_scoped_to_role_table() {
        let conn = test_db();
        let doctor_id = fixtures::doctor(&conn, 1, "Dr. Amira Mohamed");

        let found = find_identity(&conn, "doctor_1", Role::Doctor).unwrap().unwrap();
        assert_eq!(found.internal_id, doctor_id);
        assert_eq!(found.display_name, "Dr. Amira Mohamed");

        assert!(find_identity(&conn, "doctor_1", Role::Patient).unwrap().is_none());
        assert!(find_identity(&conn, "doctor_2", Role::Doctor).unwrap().is_none());
    }

    #[test]
    fn identity_prefix_enforced_by_schema() {
        let conn = test_db();
        let result =
            fixtures::insert_patient(&conn, "doctor_9", "Wrong Prefix", "wrong@example.com");
        assert!(matches!(result, Err(DatabaseError::Sqlite(_))));
    }

    #[test]
    fn doctors_listed_by_rating() {
        let conn = test_db();
        fixtures::doctor(&conn, 1, "Dr. Low");
        fixtures::doctor(&conn, 5, "Dr. High");

        let doctors = list_doctors(&conn).unwrap();
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].full_name, "Dr. High");
        assert!(get_doctor_by_user_id(&conn, "doctor_5").unwrap().is_some());
        assert!(get_doctor_by_user_id(&conn, "doctor_7").unwrap().is_none());
    }

    #[test]
    fn duplicate_connection_hits_unique_constraint() {
        let conn = test_db();
        let d = fixtures::doctor(&conn, 1, "Dr. A");
        let p = fixtures::patient(&conn, 1, "Patient A");

        insert_connection(&conn, p, d, None, None, &now_utc()).unwrap();
        let err = insert_connection(&conn, p, d, None, Some("again"), &now_utc()).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn connection_status_update_only_from_pending() {
        let conn = test_db();
        let d = fixtures::doctor(&conn, 1, "Dr. A");
        let p = fixtures::patient(&conn, 1, "Patient A");
        let id = insert_connection(&conn, p, d, None, Some("hello"), &now_utc()).unwrap();

        let changed = update_connection_status(&conn, id, ConnectionStatus::Approved, &now_utc()).unwrap();
        assert_eq!(changed, 1);
        let again = update_connection_status(&conn, id, ConnectionStatus::Rejected, &now_utc()).unwrap();
        assert_eq!(again, 0);

        let row = get_connection(&conn, id).unwrap().unwrap();
        assert_eq!(row.status, ConnectionStatus::Approved);
        assert!(row.approval_date.is_some());
        assert_eq!(row.notes.as_deref(), Some("hello"));
    }

    #[test]
    fn connection_views_filter_by_party_and_status() {
        let conn = test_db();
        let d1 = fixtures::doctor(&conn, 1, "Dr. One");
        let d2 = fixtures::doctor(&conn, 2, "Dr. Two");
        let p = fixtures::patient(&conn, 1, "Patient A");

        let first = insert_connection(&conn, p, d1, None, None, &now_utc()).unwrap();
        sleep(Duration::from_millis(5));
        let second = insert_connection(&conn, p, d2, None, None, &now_utc()).unwrap();
        update_connection_status(&conn, first, ConnectionStatus::Rejected, &now_utc()).unwrap();

        let all = list_connection_views(&conn, p, Role::Patient, None).unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(all[0].doctor_name, "Dr. Two");
        assert_eq!(all[0].patient_name, "Patient A");

        let pending = list_connection_views(&conn, p, Role::Patient, Some(ConnectionStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);

        let for_d1 = list_connection_views(&conn, d1, Role::Doctor, None).unwrap();
        assert_eq!(for_d1.len(), 1);
        assert_eq!(count_connections(&conn, d2, Role::Doctor, ConnectionStatus::Pending).unwrap(), 1);
    }

    #[test]
    fn room_insert_is_idempotent() {
        let conn = test_db();
        let d = fixtures::doctor(&conn, 1, "Dr. A");
        let p = fixtures::patient(&conn, 1, "Patient A");

        assert!(insert_room_if_absent(&conn, "doctor_1_patient_1", d, p, None).unwrap());
        assert!(!insert_room_if_absent(&conn, "doctor_1_patient_1", d, p, None).unwrap());
        assert_eq!(count_rooms(&conn, d, Role::Doctor).unwrap(), 1);
    }

    #[test]
    fn message_requires_existing_room() {
        let conn = test_db();
        let result = insert_message(
            &conn,
            &message("doctor_1_patient_1", (1, Role::Doctor), (1, Role::Patient), "hi"),
            &now_utc(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn mark_read_skips_own_messages() {
        let conn = test_db();
        let d = fixtures::doctor(&conn, 1, "Dr. A");
        let p = fixtures::patient(&conn, 1, "Patient A");
        let room = "doctor_1_patient_1";
        insert_room_if_absent(&conn, room, d, p, None).unwrap();

        insert_message(&conn, &message(room, (p, Role::Patient), (d, Role::Doctor), "one"), &now_utc()).unwrap();
        insert_message(&conn, &message(room, (d, Role::Doctor), (p, Role::Patient), "two"), &now_utc()).unwrap();
        assert_eq!(count_unread_for(&conn, d, Role::Doctor).unwrap(), 1);

        // Doctor and patient share internal id 1 here; the role keeps them apart
        let flipped = mark_room_read(&conn, room, d, Role::Doctor).unwrap();
        assert_eq!(flipped, 1);

        let messages = get_messages_by_room(&conn, room).unwrap();
        assert!(messages[0].is_read);
        assert!(!messages[1].is_read);
    }

    #[test]
    fn room_summaries_order_nulls_last_and_count_unread() {
        let conn = test_db();
        let d = fixtures::doctor(&conn, 1, "Dr. A");
        let p1 = fixtures::patient(&conn, 1, "Quiet Patient");
        let p2 = fixtures::patient(&conn, 2, "Chatty Patient");
        insert_room_if_absent(&conn, "doctor_1_patient_1", d, p1, None).unwrap();
        insert_room_if_absent(&conn, "doctor_1_patient_2", d, p2, None).unwrap();

        let now = now_utc();
        let msg = message("doctor_1_patient_2", (p2, Role::Patient), (d, Role::Doctor), "results?");
        insert_message(&conn, &msg, &now).unwrap();
        update_room_cache(&conn, "doctor_1_patient_2", &msg.message, &now).unwrap();

        let rooms = list_room_summaries(&conn, d, Role::Doctor).unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id, "doctor_1_patient_2");
        assert_eq!(rooms[0].unread_count, 1);
        assert_eq!(rooms[0].last_message.as_deref(), Some("results?"));
        assert_eq!(rooms[1].room_id, "doctor_1_patient_1");
        assert!(rooms[1].last_message_time.is_none());

        let patient_view = list_room_summaries(&conn, p2, Role::Patient).unwrap();
        assert_eq!(patient_view.len(), 1);
        assert_eq!(patient_view[0].unread_count, 0);
    }

    #[test]
    fn test_upload_insert_and_retrieve() {
        let conn = test_db();
        let p = fixtures::patient(&conn, 1, "Patient A");
        let meta = FileMeta {
            file_name: "cbc.pdf".into(),
            file_path: "/uploads/abc_cbc.pdf".into(),
            file_size: 2048,
        };
        let id = insert_test_upload(&conn, p, TestType::Cbc, &meta, &now_utc(), Some("fasting")).unwrap();

        let upload = get_test_upload(&conn, id).unwrap().unwrap();
        assert_eq!(upload.file_type, FileType::Document);
        assert_eq!(upload.status, UploadStatus::Pending);
        assert_eq!(upload.file_size, 2048);
        assert_eq!(upload.notes.as_deref(), Some("fasting"));

        assert_eq!(list_test_uploads_by_patient(&conn, p).unwrap().len(), 1);
        assert!(get_test_upload(&conn, id + 1).unwrap().is_none());
    }
}
