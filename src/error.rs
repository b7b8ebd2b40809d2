//! Error types for registry-automerge

use thiserror::Error;

/// Errors produced while evaluating and merging registry pull requests
#[derive(Error, Debug)]
pub enum Error {
    /// A request could not be delivered (connection, timeout, TLS).
    ///
    /// Retried up to the attempt ceiling before the caller sees it.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A listing could not be read completely
    #[error("fetch aborted for {url}: {reason}")]
    FetchAborted {
        /// Resource being traversed
        url: String,
        /// Why the traversal stopped
        reason: String,
    },

    /// The `Link` response header did not have the expected shape
    #[error("malformed pagination header: {0}")]
    MalformedPaginationHeader(String),

    /// A bot-authored PR reached the title gate with an unknown title
    #[error("PR #{number} has an unrecognized title: {title:?}")]
    UnexpectedTitleShape {
        /// PR number
        number: u64,
        /// Offending title
        title: String,
    },

    /// The merge endpoint answered with a non-success status
    #[error("merge of PR #{number} rejected with status {status}: {message}")]
    MergeRejected {
        /// PR number
        number: u64,
        /// HTTP status code
        status: u16,
        /// Message returned by the API
        message: String,
    },

    /// PR body has no parenthesized version token
    #[error("PR #{0} body has no parenthesized version token")]
    MissingVersionToken(u64),

    /// Caller passed something the API layer refuses
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error should abort a whole batch run.
    ///
    /// Non-fatal errors are logged against the PR that produced them and the
    /// batch moves on to the next PR.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedTitleShape { .. }
                | Self::MalformedPaginationHeader(_)
                | Self::InvalidArgument(_)
                | Self::Config(_)
                | Self::Auth(_)
                | Self::Internal(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidArgument(format!("invalid URL: {e}"))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
