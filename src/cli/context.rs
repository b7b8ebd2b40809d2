//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by run, check, and webhook.

use registry_automerge::auth::get_credentials;
use registry_automerge::config::Config;
use registry_automerge::error::Result;
use registry_automerge::platform::{GitHubService, RegistryService};
use registry_automerge::rate_limit::RateLimiter;
use std::path::PathBuf;
use tracing::debug;

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Target repository
    pub repository: Option<String>,
    /// Bot account
    pub username: Option<String>,
}

/// Shared context for CLI commands that interact with the platform
///
/// Built once per process:
/// - Load config and apply overrides
/// - Resolve credentials (environment or prompt)
/// - Create the GitHub service
/// - Create the rate limiter
pub struct CommandContext {
    /// Effective configuration
    pub config: Config,
    /// Platform service
    pub service: Box<dyn RegistryService>,
    /// Post-merge pause
    pub limiter: RateLimiter,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(overrides: &Overrides) -> Result<Self> {
        let mut config = Config::load(overrides.config.as_deref())?;
        if let Some(ref repository) = overrides.repository {
            config.repository.clone_from(repository);
        }
        if let Some(ref username) = overrides.username {
            config.username = Some(username.clone());
        }
        debug!(?config, "effective configuration");

        let credentials = get_credentials(config.username.as_deref())?;
        let service = GitHubService::new(&config, &credentials)?;
        let limiter = RateLimiter::system(config.merge_delay());

        Ok(Self {
            config,
            service: Box::new(service),
            limiter,
        })
    }
}
