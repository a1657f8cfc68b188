//! Shared types for the API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::identity::Session;
use crate::models::enums::Role;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Reject a request whose caller is not the named boundary identity.
pub fn ensure_caller(session: &Session, external_id: &str, role: Role) -> Result<(), ApiError> {
    if session.is_external(external_id, role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Caller may only act as themselves ({role} {external_id} requested)"
        )))
    }
}

/// Parse a role path/body value (`doctor` / `patient`).
pub fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user type '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            role: Role::Patient,
            external_id: "patient_1".into(),
            internal_id: 1,
            display_name: "Patient Ahmed".into(),
        }
    }

    #[test]
    fn caller_matches_own_identity() {
        assert!(ensure_caller(&session(), "patient_1", Role::Patient).is_ok());
    }

    #[test]
    fn caller_rejected_for_other_identity() {
        assert!(matches!(
            ensure_caller(&session(), "patient_2", Role::Patient),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_caller(&session(), "patient_1", Role::Doctor),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn role_parsing() {
        assert_eq!(parse_role("doctor").unwrap(), Role::Doctor);
        assert!(matches!(parse_role("nurse"), Err(ApiError::BadRequest(_))));
    }
}
