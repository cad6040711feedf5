//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod log;
pub mod mysql;
pub mod ports;
pub mod settings;
