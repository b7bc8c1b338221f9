//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve the external source id, snapshot path, and logging knobs
//!   from process environment variables.
//! - Surface missing-credential situations as fatal, typed errors.
//!
//! # Invariants
//! - A missing or blank database id is a configuration error; every other
//!   knob has a usable default.

use crate::logging::default_log_level;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable naming the external database to view.
pub const ENV_DATABASE_ID: &str = "STORYLINE_DATABASE_ID";
/// Environment variable overriding the snapshot file location.
pub const ENV_CACHE_PATH: &str = "STORYLINE_CACHE_PATH";
/// Environment variable enabling file logging into the given directory.
pub const ENV_LOG_DIR: &str = "STORYLINE_LOG_DIR";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "STORYLINE_LOG_LEVEL";

/// Default snapshot path, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = ".storyline_snapshot.json";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration failure for the current interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The external database id is not set (or blank).
    MissingDatabaseId,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDatabaseId => write!(
                f,
                "{ENV_DATABASE_ID} is not set; export it or add it to your .env file"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Identifier of the external database to fetch and render.
    pub database_id: String,
    /// Location of the single snapshot file.
    pub cache_path: PathBuf,
    /// File-logging directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Log level, defaulted by build mode.
    pub log_level: String,
}

impl TimelineConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, trimming every value and
    /// treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_id = get(ENV_DATABASE_ID).ok_or(ConfigError::MissingDatabaseId)?;
        let cache_path = get(ENV_CACHE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        let log_dir = get(ENV_LOG_DIR).map(PathBuf::from);
        let log_level = get(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());

        Ok(Self {
            database_id,
            cache_path,
            log_dir,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, TimelineConfig, DEFAULT_CACHE_PATH, ENV_CACHE_PATH, ENV_DATABASE_ID,
        ENV_LOG_DIR,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn lookup_from<'a>(vars: &'a BTreeMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|value| (*value).to_string())
    }

    #[test]
    fn missing_database_id_is_a_config_error() {
        let vars = BTreeMap::new();
        let err = TimelineConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::MissingDatabaseId);
    }

    #[test]
    fn blank_database_id_counts_as_missing() {
        let mut vars = BTreeMap::new();
        vars.insert(ENV_DATABASE_ID, "   ");
        let err = TimelineConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::MissingDatabaseId);
    }

    #[test]
    fn defaults_apply_when_only_database_id_is_set() {
        let mut vars = BTreeMap::new();
        vars.insert(ENV_DATABASE_ID, "db-1");

        let config = TimelineConfig::from_lookup(lookup_from(&vars)).expect("config resolves");
        assert_eq!(config.database_id, "db-1");
        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
        assert_eq!(config.log_dir, None);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let mut vars = BTreeMap::new();
        vars.insert(ENV_DATABASE_ID, " db-2 ");
        vars.insert(ENV_CACHE_PATH, "/tmp/snapshot.json");
        vars.insert(ENV_LOG_DIR, "/var/log/storyline");

        let config = TimelineConfig::from_lookup(lookup_from(&vars)).expect("config resolves");
        assert_eq!(config.database_id, "db-2");
        assert_eq!(config.cache_path, PathBuf::from("/tmp/snapshot.json"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/storyline")));
    }
}
