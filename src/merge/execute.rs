//! Merge execution - effectful operations

use crate::error::{Error, Result};
use crate::merge::commit::build_merge_commit;
use crate::platform::RegistryService;
use crate::types::{MergeResponse, PullRequest};
use tracing::{info, warn};

/// Squash-merge `pr` (EFFECTFUL)
///
/// Returns the raw response so the caller can count successes by status.
/// A missing version token in the PR body is returned as an error before
/// any request is made.
pub async fn execute_merge(
    service: &dyn RegistryService,
    pr: &PullRequest,
) -> Result<MergeResponse> {
    let commit = build_merge_commit(pr)?;
    let response = service.merge_pr(pr, &commit).await?;

    if response.is_success() {
        info!(
            pr_number = pr.number,
            sha = response.sha.as_deref().unwrap_or("(no sha)"),
            "merged"
        );
    } else {
        warn!(pr_number = pr.number, status = response.status, "merge rejected");
    }
    Ok(response)
}

impl MergeResponse {
    /// Turn a non-success response into [`Error::MergeRejected`]
    pub fn into_result(self, pr_number: u64) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::MergeRejected {
                number: pr_number,
                status: self.status,
                message: self.message.unwrap_or_default(),
            })
        }
    }
}
