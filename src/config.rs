//! Mock database configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. A TOML file (a missing file means defaults)
//! 3. Environment variables (PROCURE_MOCKDB_* prefix)
//!
//! Environment variables take precedence over file values.
//!
//! ```toml
//! seed = "procurement"        # or "none"
//! seed_file = "demo-seed.json"
//! reseed_on_reset = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DbError;
use crate::seed::SeedSet;

/// Environment variable prefix
const ENV_PREFIX: &str = "PROCURE_MOCKDB";

/// Which canned data a fresh store starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Start empty.
    None,
    /// Start with [`SeedSet::procurement`].
    #[default]
    Procurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockDbConfig {
    #[serde(default)]
    pub seed: SeedPolicy,

    /// JSON seed file. Takes precedence over `seed` when set.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Whether `reset()` reapplies the seed.
    #[serde(default = "default_reseed_on_reset")]
    pub reseed_on_reset: bool,
}

fn default_reseed_on_reset() -> bool {
    true
}

impl Default for MockDbConfig {
    fn default() -> Self {
        Self {
            seed: SeedPolicy::default(),
            seed_file: None,
            reseed_on_reset: default_reseed_on_reset(),
        }
    }
}

impl MockDbConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                DbError::Config(format!("failed to read {}: {}", path.display(), e))
            })?;
            Self::parse(&content)?
        } else {
            debug!(path = %path.display(), "config file missing, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self, DbError> {
        let mut config = Self::parse(toml_content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn parse(toml_content: &str) -> Result<Self, DbError> {
        toml::from_str(toml_content)
            .map_err(|e| DbError::Config(format!("failed to parse config TOML: {}", e)))
    }

    fn apply_env_overrides(&mut self) -> Result<(), DbError> {
        // PROCURE_MOCKDB_SEED
        if let Ok(val) = std::env::var(format!("{}_SEED", ENV_PREFIX)) {
            self.seed = match val.to_ascii_lowercase().as_str() {
                "none" => SeedPolicy::None,
                "procurement" => SeedPolicy::Procurement,
                other => {
                    return Err(DbError::Config(format!("unknown seed policy {:?}", other)))
                }
            };
        }

        // PROCURE_MOCKDB_SEED_FILE
        if let Ok(val) = std::env::var(format!("{}_SEED_FILE", ENV_PREFIX)) {
            self.seed_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // PROCURE_MOCKDB_RESEED_ON_RESET
        if let Ok(val) = std::env::var(format!("{}_RESEED_ON_RESET", ENV_PREFIX)) {
            self.reseed_on_reset = val.eq_ignore_ascii_case("true") || val == "1";
        }

        Ok(())
    }

    /// The seed a fresh store should receive, if any.
    pub fn seed_set(&self) -> Result<Option<SeedSet>, DbError> {
        if let Some(path) = &self.seed_file {
            return SeedSet::from_path(path).map(Some);
        }
        Ok(match self.seed {
            SeedPolicy::None => None,
            SeedPolicy::Procurement => Some(SeedSet::procurement()),
        })
    }
}
