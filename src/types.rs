//! Core types for registry-automerge

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relation name → URL mapping decoded from a `Link` header
pub type LinkRelations = HashMap<String, String>;

/// Resource links attached to a pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrLinks {
    /// Commit statuses of the PR head
    pub statuses: String,
    /// Issue comments
    pub comments: String,
    /// The issue backing the PR (labels live under it)
    pub issue: String,
}

/// A pull request snapshot, fetched once per evaluation pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Login of the PR author
    pub author: String,
    /// When the PR was opened
    pub created_at: DateTime<Utc>,
    /// Full name of the base repository (`owner/repo`)
    pub base_repo: String,
    /// Resource links used by the signal gatherers
    pub links: PrLinks,
}

impl PullRequest {
    /// Time elapsed since the PR was opened
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }
}

/// State reported by a CI provider for one context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// Check passed
    Success,
    /// Check still running
    Pending,
    /// Check failed
    Failure,
    /// Provider errored
    Error,
    /// Anything the API adds later
    #[serde(other)]
    Other,
}

/// One commit status entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEntry {
    /// CI provider identifier
    pub context: String,
    /// Reported state
    pub state: StatusState,
}

/// One issue comment on a PR
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentEntry {
    /// Comment ID
    pub id: u64,
    /// Login of the commenter
    pub author: String,
    /// Comment body text
    pub body: String,
}

/// One label attached to a PR
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelEntry {
    /// Label name
    pub name: String,
}

/// Why a paginated traversal stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// URL of the page that failed
    pub url: String,
    /// Human-readable reason
    pub reason: String,
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.reason, self.url)
    }
}

/// Entries accumulated from a paginated listing
///
/// `failure` is set when the traversal was aborted; `entries` then holds
/// whatever was read before the failing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    /// Entries in page order
    pub entries: Vec<T>,
    /// Set if the traversal did not reach the last page
    pub failure: Option<FetchFailure>,
}

impl<T> Paged<T> {
    /// A complete listing
    pub const fn complete(entries: Vec<T>) -> Self {
        Self {
            entries,
            failure: None,
        }
    }

    /// A listing cut short by `failure`
    pub const fn aborted(entries: Vec<T>, failure: FetchFailure) -> Self {
        Self {
            entries,
            failure: Some(failure),
        }
    }

    /// Whether every page was read
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert each entry, keeping the failure marker
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            entries: self.entries.into_iter().map(f).collect(),
            failure: self.failure,
        }
    }
}

/// Shape of a PR title, decided once before the gates run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleClass {
    /// `Tag <package>.jl v<version>`
    ReleaseTag {
        /// Package name without the `.jl` suffix
        package: String,
        /// Version without the leading `v`
        version: String,
    },
    /// `Register new package <package>.jl v<version>`
    Registration {
        /// Package name without the `.jl` suffix
        package: String,
        /// Version without the leading `v`
        version: String,
    },
    /// Neither pattern matched
    Unrecognized,
}

/// Which kind of mergeable PR was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    /// New version of an existing package
    Tag,
    /// First registration of a package
    Registration,
}

impl std::fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Registration => write!(f, "registration"),
        }
    }
}

/// What a blocking gate decision was based on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Basis {
    /// The data was fetched and the rule failed
    Observed,
    /// The data could not be fetched; treated as blocking
    FetchAborted(FetchFailure),
}

/// Result of running the gate pipeline on one PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// All gates passed
    Mergeable(ReleaseKind),
    /// Author is not the trusted bot
    SkippedNotBotAuthored,
    /// Someone other than the bot commented last
    SkippedHasComments(Basis),
    /// Required CI contexts are not all successful
    SkippedTestsIncomplete(Basis),
    /// At least one label is attached
    SkippedHasLabels(Basis),
    /// New registration still inside the cooldown
    SkippedTooYoung {
        /// Age of the PR at evaluation time
        age: Duration,
    },
    /// PR should be closed (no policy produces this yet)
    Closeable,
    /// Nothing to do
    NoAction,
}

impl EvaluationOutcome {
    /// Whether the merge executor should run
    pub const fn is_mergeable(&self) -> bool {
        matches!(self, Self::Mergeable(_))
    }

    /// The fetch failure behind this outcome, if any
    pub const fn fetch_failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::SkippedHasComments(Basis::FetchAborted(failure))
            | Self::SkippedTestsIncomplete(Basis::FetchAborted(failure))
            | Self::SkippedHasLabels(Basis::FetchAborted(failure)) => Some(failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = |basis: &Basis| match basis {
            Basis::Observed => String::new(),
            Basis::FetchAborted(failure) => format!(" (could not fetch: {failure})"),
        };
        match self {
            Self::Mergeable(kind) => write!(f, "mergeable ({kind})"),
            Self::SkippedNotBotAuthored => write!(f, "not authored by the registry bot"),
            Self::SkippedHasComments(basis) => write!(f, "has comments{}", suffix(basis)),
            Self::SkippedTestsIncomplete(basis) => {
                write!(f, "CI incomplete{}", suffix(basis))
            }
            Self::SkippedHasLabels(basis) => write!(f, "has labels{}", suffix(basis)),
            Self::SkippedTooYoung { age } => {
                write!(f, "too young ({}h old)", age.num_hours())
            }
            Self::Closeable => write!(f, "closeable"),
            Self::NoAction => write!(f, "no action"),
        }
    }
}

/// Squash-merge request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeCommit {
    /// Commit title
    pub commit_title: String,
    /// Commit message
    pub commit_message: String,
    /// Always `"squash"`
    pub merge_method: String,
}

/// Raw outcome of a merge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResponse {
    /// HTTP status code
    pub status: u16,
    /// `message` field of the response body, if any
    pub message: Option<String>,
    /// Merge commit SHA, if the merge happened
    pub sha: Option<String>,
}

impl MergeResponse {
    /// Merged iff the status code is below 300
    pub const fn is_success(&self) -> bool {
        self.status < 300
    }
}

/// Per-run merge/close counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    /// Mergeable PRs found
    pub merges_attempted: u32,
    /// Merges the API accepted
    pub merges_succeeded: u32,
    /// Closeable PRs found
    pub closes_attempted: u32,
    /// Closes the API accepted
    pub closes_succeeded: u32,
}

impl std::fmt::Display for RunCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "merged {}/{}, closed {}/{}",
            self.merges_succeeded,
            self.merges_attempted,
            self.closes_succeeded,
            self.closes_attempted
        )
    }
}
