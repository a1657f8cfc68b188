use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{FileType, TestType, UploadStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUpload {
    pub id: i64,
    pub patient_id: i64,
    pub test_type: TestType,
    pub file_type: FileType,
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub upload_date: NaiveDateTime,
    pub status: UploadStatus,
    pub notes: Option<String>,
}

/// Descriptor of a file stored elsewhere. Only metadata is kept here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
}
