//! Pipeline configuration with layered loading.
//!
//! Loading precedence (highest wins):
//! 1. Environment variables (`LINKMETA_*`)
//! 2. TOML config file (explicit path, else the default path when present)
//! 3. Built-in defaults
//!
//! CLI flags are applied on top by the binary after loading.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::{DEFAULT_ID_PATTERN, IdentifierExtractor};
use crate::resolver::{DEFAULT_MAX_REDIRECTS, DEFAULT_RESOLVE_TIMEOUT};
use crate::warehouse::{DEFAULT_QUERY_TEMPLATE, validate_template};

/// Prefix for environment overrides, e.g. `LINKMETA_CACHE_PATH`.
pub const ENV_PREFIX: &str = "LINKMETA_";

/// Default link cache file name.
pub const DEFAULT_CACHE_FILE: &str = "link_lookup.json";

const MAX_TIMEOUT_SECS: u64 = 3600;
const MAX_REDIRECT_LIMIT: usize = 100;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("config file '{}' not found\n  Suggestion: Check the --config path", path.display())]
    MissingFile {
        /// Requested path
        path: PathBuf,
    },

    /// Sources could not be read or merged
    #[error("failed to load configuration: {0}")]
    Load(String),

    /// A value is outside its accepted range or otherwise unusable
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Where the link → resolved URL cache is persisted.
    pub cache_path: PathBuf,

    /// Regex used to pull an identifier out of each resolved URL.
    pub id_pattern: String,

    /// Metadata query with `{id_column}` and `{id_list}` tokens.
    pub query_template: String,

    /// sqlx connection URL of the metadata warehouse.
    ///
    /// Only required when at least one identifier was extracted.
    pub warehouse_url: Option<String>,

    /// Per-link HTTP timeout in seconds.
    pub resolve_timeout_secs: u64,

    /// Redirects followed before a link counts as unresolvable.
    pub max_redirects: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            id_pattern: DEFAULT_ID_PATTERN.to_string(),
            query_template: DEFAULT_QUERY_TEMPLATE.to_string(),
            warehouse_url: None,
            resolve_timeout_secs: DEFAULT_RESOLVE_TIMEOUT.as_secs(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl PipelineConfig {
    /// Resolve timeout as a `Duration`.
    #[must_use]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    /// Loads configuration from defaults, a TOML file and the environment.
    ///
    /// With `config_file` set, that file must exist. Without it, the default
    /// path from [`resolve_default_config_path`] is used when the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] for a missing explicit file,
    /// [`ConfigError::Load`] when a source cannot be parsed, and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
            Some(path) => Some(path.to_path_buf()),
            None => resolve_default_config_path().filter(|path| path.exists()),
        };

        Self::from_figment(layered_figment(file.as_deref(), ENV_PREFIX))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract()
            .map_err(|error| ConfigError::Load(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "cache_path",
                reason: "must not be empty".to_string(),
            });
        }

        if !(1..=MAX_TIMEOUT_SECS).contains(&self.resolve_timeout_secs) {
            return Err(ConfigError::Invalid {
                field: "resolve_timeout_secs",
                reason: format!(
                    "{}. Expected range: 1..={MAX_TIMEOUT_SECS}",
                    self.resolve_timeout_secs
                ),
            });
        }

        if self.max_redirects > MAX_REDIRECT_LIMIT {
            return Err(ConfigError::Invalid {
                field: "max_redirects",
                reason: format!(
                    "{}. Expected range: 0..={MAX_REDIRECT_LIMIT}",
                    self.max_redirects
                ),
            });
        }

        IdentifierExtractor::new(&self.id_pattern).map_err(|error| ConfigError::Invalid {
            field: "id_pattern",
            reason: error.to_string(),
        })?;

        validate_template(&self.query_template).map_err(|error| ConfigError::Invalid {
            field: "query_template",
            reason: error.to_string(),
        })?;

        if let Some(url) = &self.warehouse_url
            && url.trim().is_empty()
        {
            return Err(ConfigError::Invalid {
                field: "warehouse_url",
                reason: "must not be empty when set".to_string(),
            });
        }

        Ok(())
    }
}

fn layered_figment(config_file: Option<&Path>, env_prefix: &str) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    figment.merge(Env::prefixed(env_prefix).map(|key| key.as_str().to_lowercase().into()))
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/linkmeta/config.toml`
/// 2. `$HOME/.config/linkmeta/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("linkmeta")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("linkmeta")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}
