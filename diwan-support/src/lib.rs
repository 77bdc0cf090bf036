//! # Diwan Support
//!
//! Shared utilities for the Diwan DI crates.
//!
//! This crate provides:
//! - Text rendering for error messages and definition dumps
//! - The tracing bootstrap used by binaries and demos

pub mod logging;
pub mod rendering;
