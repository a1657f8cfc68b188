//! Chat room provisioning and message relay.
//!
//! Rooms are keyed by a string derived from the doctor/patient pair and are
//! only ever created by connection approval (see `connections::decide`).
//! The relay appends to existing rooms and never creates one.
//!
//! A room caches its latest message (`last_message`/`last_message_time`).
//! Every append updates that cache in the same transaction as the insert,
//! and a message's `created_at` is never earlier than the cached time, so
//! the cache always describes the newest message in the room.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::{self, repository};
use crate::error::ServiceError;
use crate::models::enums::Role;
use crate::models::{ChatMessage, ChatRoom, NewMessage, Outcome, RoomSummary};

/// Maximum message length in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

// ═══════════════════════════════════════════
// Provisioning
// ═══════════════════════════════════════════

/// Room key for a doctor/patient pair. Any caller that needs a room id must
/// derive it here.
pub fn room_id_for(doctor_id: i64, patient_id: i64) -> String {
    format!("doctor_{doctor_id}_patient_{patient_id}")
}

/// Create the pair's room if it does not exist yet and return it.
///
/// Calling this twice (or concurrently) for the same pair is a no-op the
/// second time; the existing room is returned unchanged.
pub fn ensure_room(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
    connection_id: Option<i64>,
) -> Result<ChatRoom, ServiceError> {
    let room_id = room_id_for(doctor_id, patient_id);
    let created =
        repository::insert_room_if_absent(conn, &room_id, doctor_id, patient_id, connection_id)?;
    if created {
        tracing::info!(room_id = %room_id, ?connection_id, "Chat room provisioned");
    }
    get_room(conn, &room_id)
}

/// Post `text` into the room as the patient's opening message.
pub fn seed_message(conn: &Connection, room: &ChatRoom, text: &str) -> Result<ChatMessage, ServiceError> {
    let tx = db::begin_immediate(conn)?;
    let message_id = seed_within(&tx, room, text)?;
    tx.commit()?;

    list_messages(conn, &room.room_id)?
        .into_iter()
        .find(|m| m.id == message_id)
        .ok_or_else(|| ServiceError::Persistence("seed message vanished after commit".into()))
}

/// Seed step for callers that already hold a write transaction.
pub(crate) fn seed_within(conn: &Connection, room: &ChatRoom, text: &str) -> Result<i64, ServiceError> {
    validate_text(text)?;
    let current = get_room(conn, &room.room_id)?;
    let msg = NewMessage {
        room_id: current.room_id.clone(),
        sender_id: current.patient_id,
        sender_type: Role::Patient,
        receiver_id: current.doctor_id,
        receiver_type: Role::Doctor,
        message: text.to_string(),
    };
    let (message_id, _) = append(conn, &current, &msg)?;
    tracing::info!(room_id = %current.room_id, message_id, "Chat room seeded");
    Ok(message_id)
}

// ═══════════════════════════════════════════
// Relay
// ═══════════════════════════════════════════

/// Append a message to an existing room.
///
/// Fails with `NotFound` if the room does not exist and with `Validation`
/// if the sender and receiver are not the room's two participants.
pub fn send_message(conn: &Connection, msg: &NewMessage) -> Result<Outcome, ServiceError> {
    validate_text(&msg.message)?;
    if msg.receiver_type != msg.sender_type.counterpart() {
        return Err(ServiceError::Validation(
            "Sender and receiver must be a doctor and a patient".into(),
        ));
    }

    let tx = db::begin_immediate(conn)?;
    let room = get_room(&tx, &msg.room_id)?;
    if !room.has_participant(msg.sender_id, msg.sender_type)
        || !room.has_participant(msg.receiver_id, msg.receiver_type)
    {
        return Err(ServiceError::Validation(
            "Sender and receiver must be the participants of this room".into(),
        ));
    }

    let (message_id, created_at) = append(&tx, &room, msg)?;
    tx.commit()?;

    tracing::debug!(room_id = %room.room_id, message_id, %created_at, "Message relayed");
    Ok(Outcome::ok("Message sent successfully"))
}

/// Messages of a room, oldest first.
pub fn list_messages(conn: &Connection, room_id: &str) -> Result<Vec<ChatMessage>, ServiceError> {
    get_room(conn, room_id)?;
    Ok(repository::get_messages_by_room(conn, room_id)?)
}

/// Mark every message in the room that the reader did not send as read.
/// Returns how many messages changed state.
pub fn mark_read(
    conn: &Connection,
    room_id: &str,
    reader_id: i64,
    reader_role: Role,
) -> Result<usize, ServiceError> {
    let tx = db::begin_immediate(conn)?;
    let room = get_room(&tx, room_id)?;
    if !room.has_participant(reader_id, reader_role) {
        return Err(ServiceError::Validation(
            "Reader is not a participant of this room".into(),
        ));
    }
    let updated = repository::mark_room_read(&tx, room_id, reader_id, reader_role)?;
    tx.commit()?;

    tracing::debug!(room_id, reader_id, updated, "Messages marked read");
    Ok(updated)
}

/// Rooms in which `internal_id` takes part as `role`, newest activity first.
pub fn list_rooms_for(
    conn: &Connection,
    internal_id: i64,
    role: Role,
) -> Result<Vec<RoomSummary>, ServiceError> {
    Ok(repository::list_room_summaries(conn, internal_id, role)?)
}

pub fn get_room(conn: &Connection, room_id: &str) -> Result<ChatRoom, ServiceError> {
    repository::get_room(conn, room_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Chat room {room_id} not found")))
}

/// Text is stored as sent; trimming only decides whether it is blank.
fn validate_text(text: &str) -> Result<(), ServiceError> {
    if text.trim().is_empty() {
        return Err(ServiceError::Validation("Message cannot be empty".into()));
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ServiceError::Validation(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }
    Ok(())
}

/// Insert the message and move the room cache to it. Must run inside a
/// write transaction.
fn append(
    conn: &Connection,
    room: &ChatRoom,
    msg: &NewMessage,
) -> Result<(i64, NaiveDateTime), ServiceError> {
    let now = db::now_utc();
    let created_at = match room.last_message_time {
        Some(last) if last > now => last,
        _ => now,
    };

    let message_id = repository::insert_message(conn, msg, &created_at)?;
    repository::update_room_cache(conn, &room.room_id, &msg.message, &created_at)?;
    Ok((message_id, created_at))
}
