//! HTTP API.
//!
//! Exposes the connection, upload and chat services as JSON endpoints.
//! Routes are nested under `/api/`; every route except `/api/health` runs
//! behind the session middleware, which establishes who the caller is.

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
