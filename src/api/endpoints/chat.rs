//! Chat endpoints.
//!
//! - `GET /api/chat/rooms/:user_id/:user_type` — caller's rooms
//! - `GET /api/chat/messages/:room_id` — room history, oldest first
//! - `POST /api/chat/send` — append a message
//! - `POST /api/chat/read` — mark the counterpart's messages read

use axum::extract::State;
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::types::{ensure_caller, parse_role, ApiContext};
use crate::chat;
use crate::identity::{self, Session};
use crate::models::{ChatMessage, ChatRoom, NewMessage, Outcome, RoomSummary};

#[derive(Serialize)]
pub struct RoomsResponse {
    pub success: bool,
    pub rooms: Vec<RoomSummary>,
}

/// `GET /api/chat/rooms/:user_id/:user_type`
pub async fn rooms(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiPath((user_id, user_type)): ApiPath<(String, String)>,
) -> Result<Json<RoomsResponse>, ApiError> {
    let role = parse_role(&user_type)?;
    ensure_caller(&session, &user_id, role)?;

    let conn = ctx.core.open_db()?;
    let rooms = chat::list_rooms_for(&conn, session.internal_id, session.role)?;
    Ok(Json(RoomsResponse {
        success: true,
        rooms,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub success: bool,
    pub counterpart_name: String,
    pub messages: Vec<ChatMessage>,
}

/// `GET /api/chat/messages/:room_id`
pub async fn messages(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiPath(room_id): ApiPath<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let room = participant_room(&conn, &session, &room_id)?;

    let other = session.role.counterpart();
    let counterpart_name = identity::display_name(&conn, room.participant(other), other)?;
    let messages = chat::list_messages(&conn, &room_id)?;
    Ok(Json(MessagesResponse {
        success: true,
        counterpart_name,
        messages,
    }))
}

/// `POST /api/chat/send` — the caller must be the sender.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiJson(req): ApiJson<NewMessage>,
) -> Result<Json<Outcome>, ApiError> {
    if !session.is_internal(req.sender_id, req.sender_type) {
        return Err(ApiError::Forbidden("Caller may only send as themselves".into()));
    }

    let conn = ctx.core.open_db()?;
    let outcome = chat::send_message(&conn, &req)?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub room_id: String,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: usize,
}

/// `POST /api/chat/read` — mark messages the caller received as read.
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<Session>,
    ApiJson(req): ApiJson<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    participant_room(&conn, &session, &req.room_id)?;

    let updated = chat::mark_read(&conn, &req.room_id, session.internal_id, session.role)?;
    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

/// Load a room the caller takes part in: 404 if absent, 403 if foreign.
fn participant_room(conn: &Connection, session: &Session, room_id: &str) -> Result<ChatRoom, ApiError> {
    let room = chat::get_room(conn, room_id)?;
    if !room.has_participant(session.internal_id, session.role) {
        return Err(ApiError::Forbidden("Caller is not a participant of this room".into()));
    }
    Ok(room)
}
