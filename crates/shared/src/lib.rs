//! Shared utilities for the function builder backend.
//!
//! This crate provides common functionality used across the other crates:
//! - Zip archive packing and extraction
//! - Common validation logic

pub mod archive;
pub mod validation;
