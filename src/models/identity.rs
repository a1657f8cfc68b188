use serde::{Deserialize, Serialize};

use super::enums::Role;

/// A resolved doctor or patient. Created outside this system and only read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub internal_id: i64,
    pub external_id: String,
    pub role: Role,
    pub display_name: String,
}

/// Public doctor profile as listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: i64,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub specialization: String,
    pub experience_years: u32,
    pub rating: f64,
    pub bio: Option<String>,
}
