//! HTTP route handlers.

pub mod builds;
pub mod functions;
pub mod health;
