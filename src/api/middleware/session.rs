//! Session middleware.
//!
//! Reads `X-User-Id` (external id) and `X-User-Role`, resolves them to a
//! [`Session`] and injects it into request extensions for downstream
//! handlers. A missing, malformed or unknown identity is a 401.

use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::error::ServiceError;
use crate::identity::{self, Session};
use crate::models::enums::Role;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let (external_id, role) = caller_headers(req.headers()).ok_or(ApiError::Unauthorized)?;

    let session: Session = {
        let conn = ctx.core.open_db()?;
        match identity::open_session(&conn, &external_id, role) {
            Ok(session) => session,
            Err(ServiceError::NotFound(_)) => {
                tracing::debug!(external_id, role = %role, "Unknown caller rejected");
                return Err(ApiError::Unauthorized);
            }
            Err(e) => return Err(e.into()),
        }
    }; // Connection dropped here, before any .await

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

fn caller_headers(headers: &HeaderMap) -> Option<(String, Role)> {
    let external_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())?;
    let role = headers
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<Role>().ok())?;
    Some((external_id.to_string(), role))
}
