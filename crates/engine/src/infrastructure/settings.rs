//! Environment-backed settings.
//!
//! Values come from process environment variables, optionally seeded from
//! `.env.local` / `.env` files. Every reader takes a lookup function so tests
//! can supply a map instead of mutating the process environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use groupbridge_domain::{
    DomainError, KeyFilter, PrimaryGroupConfig, SecondaryGroupConfig, SecondaryStorage,
    WebGroupConfig,
};
use url::Url;

use crate::infrastructure::ports::QueryError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Errors reading settings from the environment.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Config(#[from] DomainError),
}

/// Load `.env.local` then `.env` from `dir` when present.
///
/// Variables already set in the process environment win.
pub fn load_dotenv(dir: &Path) {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = dir.join(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load env file");
            }
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Connection settings for the web application's database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

impl DatabaseSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        Ok(Self {
            host: optional(&lookup, "DATABASE_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port: parsed(&lookup, "DATABASE_PORT")?.unwrap_or(DEFAULT_PORT),
            name: required(&lookup, "DATABASE_NAME")?,
            username: required(&lookup, "DATABASE_USERNAME")?,
            password: lookup("DATABASE_PASSWORD").unwrap_or_default(),
            max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout_secs: parsed(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        })
    }

    /// Build the `mysql://` URL for these settings.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Endpoint` when the pieces do not form a valid URL
    /// (e.g. a host containing a slash).
    pub fn connection_url(&self) -> Result<Url, QueryError> {
        let mut url = Url::parse(&format!("mysql://{}:{}", self.host, self.port))
            .map_err(|e| QueryError::endpoint(format!("{} (host '{}')", e, self.host)))?;
        if url.host_str().is_none() {
            return Err(QueryError::endpoint(format!("no host in '{}'", self.host)));
        }
        url.set_path(&format!("/{}", self.name));
        url.set_username(&self.username)
            .map_err(|_| QueryError::endpoint("username cannot be set on this URL"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| QueryError::endpoint("password cannot be set on this URL"))?;
        }
        Ok(url)
    }
}

// =============================================================================
// Web group configuration
// =============================================================================

/// Read and validate the web application's group table layout.
pub fn web_group_config_from_env() -> Result<WebGroupConfig, SettingsError> {
    web_group_config_from_lookup(|key| std::env::var(key).ok())
}

pub fn web_group_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<WebGroupConfig, SettingsError> {
    let primary = PrimaryGroupConfig {
        enabled: flag(&lookup, "WEBAPP_PRIMARY_GROUP_ENABLED")?,
        table: lookup("WEBAPP_PRIMARY_GROUP_TABLE").unwrap_or_default(),
        user_id_column: lookup("WEBAPP_PRIMARY_GROUP_USER_ID_COLUMN").unwrap_or_default(),
        group_id_column: lookup("WEBAPP_PRIMARY_GROUP_GROUP_ID_COLUMN").unwrap_or_default(),
        key: if flag(&lookup, "WEBAPP_PRIMARY_GROUP_USES_KEY")? {
            Some(KeyFilter::new(
                lookup("WEBAPP_PRIMARY_GROUP_KEY_COLUMN").unwrap_or_default(),
                lookup("WEBAPP_PRIMARY_GROUP_KEY_NAME").unwrap_or_default(),
            ))
        } else {
            None
        },
    };

    let storage = match optional(&lookup, "WEBAPP_SECONDARY_GROUP_STORAGE_METHOD") {
        Some(method) => method.parse::<SecondaryStorage>()?,
        None => SecondaryStorage::default(),
    };
    let key = optional(&lookup, "WEBAPP_SECONDARY_GROUP_KEY_COLUMN").map(|column| {
        KeyFilter::new(
            column,
            lookup("WEBAPP_SECONDARY_GROUP_KEY_NAME").unwrap_or_default(),
        )
    });
    let secondary = SecondaryGroupConfig {
        enabled: flag(&lookup, "WEBAPP_SECONDARY_GROUP_ENABLED")?,
        table: lookup("WEBAPP_SECONDARY_GROUP_TABLE").unwrap_or_default(),
        user_id_column: lookup("WEBAPP_SECONDARY_GROUP_USER_ID_COLUMN").unwrap_or_default(),
        group_id_column: lookup("WEBAPP_SECONDARY_GROUP_GROUP_ID_COLUMN").unwrap_or_default(),
        key,
        // Whitespace is a legitimate delimiter, so this one is not trimmed.
        delimiter: lookup("WEBAPP_SECONDARY_GROUP_GROUP_ID_DELIMITER")
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| ",".into()),
        storage,
    };

    let config = WebGroupConfig::new(primary, secondary);
    config.validate()?;
    Ok(config)
}

// =============================================================================
// Lookup helpers
// =============================================================================

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, SettingsError> {
    optional(lookup, name).ok_or(SettingsError::Missing(name))
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, SettingsError> {
    optional(lookup, name)
        .map(|value| {
            value
                .parse()
                .map_err(|_| SettingsError::Invalid { name, value })
        })
        .transpose()
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<bool, SettingsError> {
    match optional(lookup, name) {
        None => Ok(false),
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(SettingsError::Invalid { name, value }),
        },
    }
}
