//! Tempo Core - Foundational types for the Tempo runtime
//!
//! This crate provides the types every other Tempo crate depends on:
//! - `TempoError` - The workspace-wide error enum
//! - `Result` - Result alias over `TempoError`

mod error;

pub use error::{Result, TempoError};
