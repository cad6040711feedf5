//! Web application group table configuration
//!
//! Describes where the web application keeps each user's primary group and
//! secondary groups. The engine captures one of these at construction and
//! never mutates it, so a lookup always sees a consistent set of flags.
//!
//! Primary groups live in one column per user. Secondary groups come in four
//! layouts, see [`SecondaryStorage`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const DEFAULT_DELIMITER: &str = ",";

/// Discriminator column/value pair for tables shared between several kinds
/// of rows (e.g. a `user_meta` table keyed by `meta_key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFilter {
    pub column: String,
    pub value: String,
}

impl KeyFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// How secondary group memberships are laid out in the web application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecondaryStorage {
    /// One row per user, groups joined by the delimiter in one column.
    #[default]
    Single,
    /// One keyed row per user, groups joined by the delimiter in the value column.
    KeyValue,
    /// One row per membership.
    Junction,
    /// One keyed row per membership.
    MultipleKeyValue,
}

impl SecondaryStorage {
    /// Whether a single column holds several delimiter-joined groups.
    pub fn is_delimited(self) -> bool {
        matches!(self, Self::Single | Self::KeyValue)
    }

    /// Whether the layout is only meaningful with a [`KeyFilter`].
    pub fn requires_key(self) -> bool {
        matches!(self, Self::KeyValue | Self::MultipleKeyValue)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::KeyValue => "key-value",
            Self::Junction => "junction",
            Self::MultipleKeyValue => "multiple-key-value",
        }
    }
}

impl fmt::Display for SecondaryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SecondaryStorage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "key-value" => Ok(Self::KeyValue),
            "junction" => Ok(Self::Junction),
            "multiple-key-value" => Ok(Self::MultipleKeyValue),
            _ => Err(DomainError::parse(format!(
                "Unknown secondary group storage method: {}",
                s
            ))),
        }
    }
}

/// Where each user's single primary group is stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrimaryGroupConfig {
    pub enabled: bool,
    pub table: String,
    pub user_id_column: String,
    pub group_id_column: String,
    /// Set when the table is shared and rows are scoped by a key column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyFilter>,
}

/// Where each user's secondary groups are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryGroupConfig {
    pub enabled: bool,
    pub table: String,
    pub user_id_column: String,
    pub group_id_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyFilter>,
    /// Separator between group IDs for delimited storage.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub storage: SecondaryStorage,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl Default for SecondaryGroupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            table: String::new(),
            user_id_column: String::new(),
            group_id_column: String::new(),
            key: None,
            delimiter: default_delimiter(),
            storage: SecondaryStorage::default(),
        }
    }
}

/// Immutable snapshot of both group features.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebGroupConfig {
    #[serde(default)]
    pub primary: PrimaryGroupConfig,
    #[serde(default)]
    pub secondary: SecondaryGroupConfig,
}

impl WebGroupConfig {
    pub fn new(primary: PrimaryGroupConfig, secondary: SecondaryGroupConfig) -> Self {
        Self { primary, secondary }
    }

    /// Check that every enabled feature names enough of the schema to be
    /// queried. Disabled features are not inspected.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first missing setting.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.primary.enabled {
            let p = &self.primary;
            require("primary group table", &p.table)?;
            require("primary group user ID column", &p.user_id_column)?;
            require("primary group group ID column", &p.group_id_column)?;
            if let Some(key) = &p.key {
                require("primary group key column", &key.column)?;
            }
        }

        if self.secondary.enabled {
            let s = &self.secondary;
            require("secondary group table", &s.table)?;
            require("secondary group user ID column", &s.user_id_column)?;
            require("secondary group group ID column", &s.group_id_column)?;
            match &s.key {
                Some(key) => require("secondary group key column", &key.column)?,
                None if s.storage.requires_key() => {
                    return Err(DomainError::validation(format!(
                        "secondary group storage method '{}' requires a key column and key name",
                        s.storage
                    )));
                }
                None => {}
            }
            if s.storage.is_delimited() && s.delimiter.is_empty() {
                return Err(DomainError::validation(format!(
                    "secondary group storage method '{}' requires a group ID delimiter",
                    s.storage
                )));
            }
        }

        Ok(())
    }
}

fn require(setting: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", setting)));
    }
    Ok(())
}
