//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Session resolver → 2. Audit logger

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Session → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/connections", post(endpoints::connections::create))
        .route(
            "/connections/patient/:user_id",
            get(endpoints::connections::for_patient),
        )
        .route(
            "/connections/doctor/:user_id",
            get(endpoints::connections::for_doctor),
        )
        .route("/connections/approve", post(endpoints::connections::decide))
        .route("/uploads", post(endpoints::uploads::record))
        .route("/uploads/:upload_id", get(endpoints::uploads::detail))
        .route("/uploads/patient/:user_id", get(endpoints::uploads::for_patient))
        .route("/chat/rooms/:user_id/:user_type", get(endpoints::chat::rooms))
        .route("/chat/messages/:room_id", get(endpoints::chat::messages))
        .route("/chat/send", post(endpoints::chat::send))
        .route("/chat/read", post(endpoints::chat::mark_read))
        .route("/doctors", get(endpoints::doctors::list))
        .route("/doctors/:user_id", get(endpoints::doctors::detail))
        .route("/dashboard", get(endpoints::dashboard::summary))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::session::require_session))
        .layer(axum::Extension(ctx));

    let unprotected = Router::new().route("/health", get(endpoints::health::check));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(CorsLayer::permissive())
}
