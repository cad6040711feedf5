//! Domain types for bridging a web application's group tables.
//!
//! Nothing here performs I/O. The engine crate owns the ports and adapters.

pub mod error;
pub mod ids;
pub mod value_objects;

pub use error::DomainError;
pub use ids::{GroupId, UserId};
pub use value_objects::{
    split_group_ids, KeyFilter, PrimaryGroupConfig, SecondaryGroupConfig, SecondaryStorage,
    WebGroupConfig,
};
