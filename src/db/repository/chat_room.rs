use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, parse_timestamp, DatabaseError};
use crate::models::enums::Role;
use crate::models::*;

/// Insert the room for a doctor/patient pair unless one already exists.
/// Returns `true` when this call created the row.
pub fn insert_room_if_absent(
    conn: &Connection,
    room_id: &str,
    doctor_id: i64,
    patient_id: i64,
    connection_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let inserted = conn.execute(
        "INSERT INTO chat_rooms (room_id, doctor_id, patient_id, connection_id)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT DO NOTHING",
        params![room_id, doctor_id, patient_id, connection_id],
    )?;
    Ok(inserted == 1)
}

pub fn get_room(conn: &Connection, room_id: &str) -> Result<Option<ChatRoom>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, room_id, doctor_id, patient_id, last_message, last_message_time, connection_id
             FROM chat_rooms WHERE room_id = ?1",
            params![room_id],
            |row| {
                Ok(RoomRow {
                    id: row.get(0)?,
                    room_id: row.get(1)?,
                    doctor_id: row.get(2)?,
                    patient_id: row.get(3)?,
                    last_message: row.get(4)?,
                    last_message_time: row.get(5)?,
                    connection_id: row.get(6)?,
                })
            },
        )
        .optional()?;

    row.map(room_from_row).transpose()
}

/// Point the room's last-message cache at a newly appended message.
pub fn update_room_cache(
    conn: &Connection,
    room_id: &str,
    message: &str,
    time: &NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE chat_rooms SET last_message = ?1, last_message_time = ?2 WHERE room_id = ?3",
        params![message, format_timestamp(time), room_id],
    )?;
    Ok(changed)
}

const ROOMS_FOR_DOCTOR: &str = "
    SELECT cr.id, cr.room_id, cr.doctor_id, d.full_name, cr.patient_id, p.full_name,
           cr.last_message, cr.last_message_time, cr.connection_id,
           (SELECT COUNT(*) FROM chat_messages m
            WHERE m.room_id = cr.room_id AND m.is_read = 0
              AND m.receiver_id = ?1 AND m.receiver_type = 'doctor')
    FROM chat_rooms cr
    JOIN doctors d ON cr.doctor_id = d.id
    JOIN patients p ON cr.patient_id = p.id
    WHERE cr.doctor_id = ?1
    ORDER BY cr.last_message_time DESC NULLS LAST, cr.id DESC";

const ROOMS_FOR_PATIENT: &str = "
    SELECT cr.id, cr.room_id, cr.doctor_id, d.full_name, cr.patient_id, p.full_name,
           cr.last_message, cr.last_message_time, cr.connection_id,
           (SELECT COUNT(*) FROM chat_messages m
            WHERE m.room_id = cr.room_id AND m.is_read = 0
              AND m.receiver_id = ?1 AND m.receiver_type = 'patient')
    FROM chat_rooms cr
    JOIN doctors d ON cr.doctor_id = d.id
    JOIN patients p ON cr.patient_id = p.id
    WHERE cr.patient_id = ?1
    ORDER BY cr.last_message_time DESC NULLS LAST, cr.id DESC";

/// Rooms the viewer participates in, most recently active first and
/// never-messaged rooms last.
pub fn list_room_summaries(
    conn: &Connection,
    viewer_id: i64,
    viewer_role: Role,
) -> Result<Vec<RoomSummary>, DatabaseError> {
    let sql = match viewer_role {
        Role::Doctor => ROOMS_FOR_DOCTOR,
        Role::Patient => ROOMS_FOR_PATIENT,
    };
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt.query_map(params![viewer_id], |row| {
        Ok(RoomSummaryRow {
            id: row.get(0)?,
            room_id: row.get(1)?,
            doctor_id: row.get(2)?,
            doctor_name: row.get(3)?,
            patient_id: row.get(4)?,
            patient_name: row.get(5)?,
            last_message: row.get(6)?,
            last_message_time: row.get(7)?,
            connection_id: row.get(8)?,
            unread_count: row.get(9)?,
        })
    })?;

    let mut rooms = Vec::new();
    for row in rows {
        let row = row?;
        rooms.push(RoomSummary {
            id: row.id,
            room_id: row.room_id,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            last_message: row.last_message,
            last_message_time: row
                .last_message_time
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            connection_id: row.connection_id,
            unread_count: row.unread_count,
        });
    }
    Ok(rooms)
}

pub fn count_rooms(conn: &Connection, party_id: i64, role: Role) -> Result<u32, DatabaseError> {
    let sql = match role {
        Role::Doctor => "SELECT COUNT(*) FROM chat_rooms WHERE doctor_id = ?1",
        Role::Patient => "SELECT COUNT(*) FROM chat_rooms WHERE patient_id = ?1",
    };
    let count = conn.query_row(sql, params![party_id], |row| row.get::<_, u32>(0))?;
    Ok(count)
}

struct RoomRow {
    id: i64,
    room_id: String,
    doctor_id: i64,
    patient_id: i64,
    last_message: Option<String>,
    last_message_time: Option<String>,
    connection_id: Option<i64>,
}

struct RoomSummaryRow {
    id: i64,
    room_id: String,
    doctor_id: i64,
    doctor_name: String,
    patient_id: i64,
    patient_name: String,
    last_message: Option<String>,
    last_message_time: Option<String>,
    connection_id: Option<i64>,
    unread_count: u32,
}

fn room_from_row(row: RoomRow) -> Result<ChatRoom, DatabaseError> {
    Ok(ChatRoom {
        id: row.id,
        room_id: row.room_id,
        doctor_id: row.doctor_id,
        patient_id: row.patient_id,
        last_message: row.last_message,
        last_message_time: row
            .last_message_time
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
        connection_id: row.connection_id,
    })
}
