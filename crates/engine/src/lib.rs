//! groupbridge Engine library.
//!
//! Answers group membership questions against a web application's own
//! tables so a game server can mirror its permission groups.
//!
//! ## Structure
//!
//! - `use_cases/` - Membership lookups (`WebGroupDao` and its schema strategies)
//! - `infrastructure/` - External dependency implementations (ports + adapters)

pub mod infrastructure;
pub mod use_cases;

pub use use_cases::groups::{web_group_dao, WebGroupDao};
