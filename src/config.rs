//! Run configuration
//!
//! Loaded once at process start from an optional TOML file and then passed
//! by reference to everything that talks to the API.

use crate::error::{Error, Result};
use crate::platform::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Repository watched when nothing else is configured
pub const DEFAULT_REPOSITORY: &str = "JuliaLang/METADATA.jl";

/// Public GitHub API root
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Pause after each issued merge, in seconds
pub const DEFAULT_MERGE_DELAY_SECS: u64 = 10;

/// Directory name under the platform config dir
const CONFIG_DIR: &str = "registry-automerge";

/// Filename for the config file
const CONFIG_FILE: &str = "config.toml";

/// Merge bot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target repository (`owner/repo`)
    pub repository: String,
    /// Account the bot acts as; prompted for when absent
    pub username: Option<String>,
    /// API root URL
    pub api_base: String,
    /// Pause after each issued merge, in seconds
    pub merge_delay_secs: u64,
    /// Attempt ceiling per request
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            username: None,
            api_base: DEFAULT_API_BASE.to_string(),
            merge_delay_secs: DEFAULT_MERGE_DELAY_SECS,
            max_attempts: retry.max_attempts,
            retry_backoff_ms: u64::try_from(retry.backoff.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read if present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut parts = self.repository.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty()
        );
        if !well_formed {
            return Err(Error::Config(format!(
                "repository must be 'owner/repo', got {:?}",
                self.repository
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        url::Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("invalid api_base {:?}: {e}", self.api_base)))?;
        Ok(())
    }

    /// Retry policy for outbound requests
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// Pause after each issued merge
    pub const fn merge_delay(&self) -> Duration {
        Duration::from_secs(self.merge_delay_secs)
    }
}
