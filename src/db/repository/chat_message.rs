use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::{format_timestamp, parse_timestamp, DatabaseError};
use crate::models::enums::Role;
use crate::models::*;

pub fn insert_message(
    conn: &Connection,
    msg: &NewMessage,
    created_at: &NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO chat_messages
         (room_id, sender_id, sender_type, receiver_id, receiver_type, message, is_read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        params![
            msg.room_id,
            msg.sender_id,
            msg.sender_type.as_str(),
            msg.receiver_id,
            msg.receiver_type.as_str(),
            msg.message,
            format_timestamp(created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_messages_by_room(
    conn: &Connection,
    room_id: &str,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, room_id, sender_id, sender_type, receiver_id, receiver_type,
                message, is_read, created_at
         FROM chat_messages WHERE room_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![room_id], |row| {
        Ok(MessageRow {
            id: row.get(0)?,
            room_id: row.get(1)?,
            sender_id: row.get(2)?,
            sender_type: row.get(3)?,
            receiver_id: row.get(4)?,
            receiver_type: row.get(5)?,
            message: row.get(6)?,
            is_read: row.get(7)?,
            created_at: row.get(8)?,
        })
    })?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(message_from_row(row?)?);
    }
    Ok(messages)
}

/// Flag every unread message in the room that the reader did not author.
pub fn mark_room_read(
    conn: &Connection,
    room_id: &str,
    reader_id: i64,
    reader_role: Role,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE chat_messages SET is_read = 1
         WHERE room_id = ?1 AND is_read = 0
           AND NOT (sender_id = ?2 AND sender_type = ?3)",
        params![room_id, reader_id, reader_role.as_str()],
    )?;
    Ok(changed)
}

/// Unread messages addressed to one participant across all rooms.
pub fn count_unread_for(
    conn: &Connection,
    receiver_id: i64,
    receiver_role: Role,
) -> Result<u32, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM chat_messages
         WHERE receiver_id = ?1 AND receiver_type = ?2 AND is_read = 0",
        params![receiver_id, receiver_role.as_str()],
        |row| row.get::<_, u32>(0),
    )?;
    Ok(count)
}

struct MessageRow {
    id: i64,
    room_id: String,
    sender_id: i64,
    sender_type: String,
    receiver_id: i64,
    receiver_type: String,
    message: String,
    is_read: bool,
    created_at: String,
}

fn message_from_row(row: MessageRow) -> Result<ChatMessage, DatabaseError> {
    Ok(ChatMessage {
        id: row.id,
        room_id: row.room_id,
        sender_id: row.sender_id,
        sender_type: Role::from_str(&row.sender_type)?,
        receiver_id: row.receiver_id,
        receiver_type: Role::from_str(&row.receiver_type)?,
        message: row.message,
        is_read: row.is_read,
        created_at: parse_timestamp(&row.created_at)?,
    })
}
