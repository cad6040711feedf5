//! Value objects - Immutable objects defined by their attributes

mod group_list;
mod web_group_config;

pub use group_list::split_group_ids;
pub use web_group_config::{
    KeyFilter, PrimaryGroupConfig, SecondaryGroupConfig, SecondaryStorage, WebGroupConfig,
};
