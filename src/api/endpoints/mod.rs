//! API endpoint handlers, one module per resource.
//!
//! Handlers open a connection per request, check that the caller acts as
//! themselves, and delegate to the service modules.

pub mod chat;
pub mod connections;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod uploads;
