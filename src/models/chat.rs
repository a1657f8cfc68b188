use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: i64,
    pub room_id: String,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub last_message: Option<String>,
    pub last_message_time: Option<NaiveDateTime>,
    pub connection_id: Option<i64>,
}

impl ChatRoom {
    /// Internal id of the participant holding `role` in this room.
    pub fn participant(&self, role: Role) -> i64 {
        match role {
            Role::Doctor => self.doctor_id,
            Role::Patient => self.patient_id,
        }
    }

    pub fn has_participant(&self, id: i64, role: Role) -> bool {
        self.participant(role) == id
    }
}

/// Room as shown in a user's room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: i64,
    pub room_id: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    pub last_message: Option<String>,
    pub last_message_time: Option<NaiveDateTime>,
    pub connection_id: Option<i64>,
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub room_id: String,
    pub sender_id: i64,
    pub sender_type: Role,
    pub receiver_id: i64,
    pub receiver_type: Role,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

/// A message as submitted to the relay, before the server stamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub room_id: String,
    pub sender_id: i64,
    pub sender_type: Role,
    pub receiver_id: i64,
    pub receiver_type: Role,
    pub message: String,
}
