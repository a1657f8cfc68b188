pub mod chat;
pub mod connection;
pub mod enums;
pub mod identity;
pub mod test_upload;

pub use chat::*;
pub use connection::*;
pub use identity::*;
pub use test_upload::*;

use serde::{Deserialize, Serialize};

/// `{success, message}` result of a write that has no payload of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
