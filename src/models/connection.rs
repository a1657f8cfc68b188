use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::ConnectionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub status: ConnectionStatus,
    pub request_date: NaiveDateTime,
    pub approval_date: Option<NaiveDateTime>,
    pub test_upload_id: Option<i64>,
    pub notes: Option<String>,
}

/// Connection joined with both parties' display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub status: ConnectionStatus,
    pub request_date: NaiveDateTime,
    pub approval_date: Option<NaiveDateTime>,
    pub test_upload_id: Option<i64>,
    pub notes: Option<String>,
}
