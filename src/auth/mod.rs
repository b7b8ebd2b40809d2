//! Credentials for the merge bot account
//!
//! The token comes from an environment variable, falling back to an
//! interactive prompt when running attached to a terminal.

use crate::error::{Error, Result};
use dialoguer::{Input, Password};
use tracing::debug;

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["REGISTRY_AUTOMERGE_TOKEN", "GITHUB_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from environment variable
    EnvVar,
    /// Token typed at an interactive prompt
    Prompt,
}

/// Account name and API token
#[derive(Clone)]
pub struct Credentials {
    /// Account login
    pub username: String,
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Look up a token with `lookup` (normally `std::env::var`)
pub fn token_from_env_with<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

/// Resolve credentials, prompting for anything the environment lacks
pub fn get_credentials(username: Option<&str>) -> Result<Credentials> {
    let username = match username {
        Some(name) => name.to_string(),
        None => Input::<String>::new()
            .with_prompt("GitHub username")
            .interact_text()
            .map_err(|e| Error::Auth(format!("failed to read username: {e}")))?,
    };

    if let Some(token) = token_from_env_with(|name| std::env::var(name).ok()) {
        debug!(%username, "using token from environment");
        return Ok(Credentials {
            username,
            token,
            source: AuthSource::EnvVar,
        });
    }

    let token = Password::new()
        .with_prompt(format!("GitHub token for {username}"))
        .interact()
        .map_err(|e| Error::Auth(format!("failed to read token: {e}")))?;

    if token.trim().is_empty() {
        return Err(Error::Auth("empty token".to_string()));
    }

    Ok(Credentials {
        username,
        token: token.trim().to_string(),
        source: AuthSource::Prompt,
    })
}
