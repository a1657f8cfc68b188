//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Session — resolves the caller from `X-User-Id` / `X-User-Role`
//! 2. Audit logger — logs after the session is known

pub mod audit;
pub mod session;
