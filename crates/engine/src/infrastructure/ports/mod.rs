//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (the web application's MySQL schema, or anything that speaks SQL)
//! - Diagnostics (the host's severe-level log sink)

mod error;
mod log;
mod sql;

// =============================================================================
// SQL Port
// =============================================================================
pub use sql::{quote_identifier, ResultSet, Row, SqlPort, Statement};

// =============================================================================
// Log Port
// =============================================================================
pub use log::LogPort;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use log::MockLogPort;
#[cfg(test)]
pub use sql::MockSqlPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::QueryError;
