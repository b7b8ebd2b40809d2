//! Hosting platform access
//!
//! The gate pipeline and dispatch loop only talk to [`RegistryService`], so
//! tests can swap in a mock while production uses [`GitHubService`].

mod github;
pub mod pagination;
pub mod retry;

pub use github::GitHubService;
pub use pagination::{PageFetcher, parse_link_header};
pub use retry::RetryPolicy;

use crate::error::Result;
use crate::types::{
    CommentEntry, LabelEntry, MergeCommit, MergeResponse, Paged, PullRequest, StatusEntry,
};
use async_trait::async_trait;

/// Operations the merge bot needs from the hosting platform
///
/// The three signal gatherers (`statuses`, `comments`, `labels`) return
/// [`Paged`] so a listing that could not be read completely is visible to
/// the caller instead of looking like an empty collection.
#[async_trait]
pub trait RegistryService: Send + Sync {
    /// List open PRs against the configured repository
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>>;

    /// Fetch a single PR by number
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest>;

    /// Commit statuses reported for the PR head
    async fn statuses(&self, pr: &PullRequest) -> Result<Paged<StatusEntry>>;

    /// Issue comments on the PR
    async fn comments(&self, pr: &PullRequest) -> Result<Paged<CommentEntry>>;

    /// Labels attached to the PR
    async fn labels(&self, pr: &PullRequest) -> Result<Paged<LabelEntry>>;

    /// Issue the squash-merge request.
    ///
    /// Returns the raw response; callers decide success from the status.
    async fn merge_pr(&self, pr: &PullRequest, commit: &MergeCommit) -> Result<MergeResponse>;
}
