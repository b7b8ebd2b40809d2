//! Squash commit construction - pure functions, no I/O

use crate::error::{Error, Result};
use crate::types::{MergeCommit, PullRequest};
use regex::Regex;
use std::sync::LazyLock;

/// Message recorded on every automated merge
pub const MERGE_COMMIT_MESSAGE: &str =
    "Automatically merged by registry-automerge: CI passed, no comments, no labels.";

/// Merge method sent to the API
pub const MERGE_METHOD: &str = "squash";

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("parenthesized pattern is valid"));

/// First parenthesized substring of `body`, parentheses included
pub fn extract_version_token(body: &str) -> Option<&str> {
    PARENTHESIZED.find(body).map(|m| m.as_str())
}

/// Build the squash commit for `pr`.
///
/// Title is `"<PR title> (#<number>) <token>"` where the token is the first
/// parenthesized part of the PR body.
pub fn build_merge_commit(pr: &PullRequest) -> Result<MergeCommit> {
    let token = pr
        .body
        .as_deref()
        .and_then(extract_version_token)
        .ok_or(Error::MissingVersionToken(pr.number))?;

    Ok(MergeCommit {
        commit_title: format!("{} (#{}) {token}", pr.title, pr.number),
        commit_message: MERGE_COMMIT_MESSAGE.to_string(),
        merge_method: MERGE_METHOD.to_string(),
    })
}
