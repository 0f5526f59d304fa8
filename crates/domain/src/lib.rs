//! Domain layer for the function builder backend.
//!
//! This crate contains:
//! - Domain models (Runtime, FunctionImage, ImageRef)
//! - Business logic services (runtime scaffolding)

pub mod models;
pub mod services;
