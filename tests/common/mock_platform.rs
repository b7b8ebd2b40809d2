//! Mock registry service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use registry_automerge::error::{Error, Result};
use registry_automerge::platform::RegistryService;
use registry_automerge::types::{
    CommentEntry, FetchFailure, LabelEntry, MergeCommit, MergeResponse, Paged, PullRequest,
    StatusEntry,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub commit: MergeCommit,
}

/// Simple mock registry service for testing
///
/// This manually implements `RegistryService` rather than using mockall,
/// so call order across the three gatherers can be asserted directly.
///
/// Features:
/// - Configurable responses per PR (complete or aborted listings)
/// - Call tracking for verification
/// - Error injection for failure path testing
///
/// Unconfigured listings are complete and empty; unconfigured merges
/// succeed with status 200.
pub struct MockRegistryService {
    open_prs: Mutex<Vec<PullRequest>>,
    statuses_responses: Mutex<HashMap<u64, Paged<StatusEntry>>>,
    comments_responses: Mutex<HashMap<u64, Paged<CommentEntry>>>,
    labels_responses: Mutex<HashMap<u64, Paged<LabelEntry>>>,
    merge_responses: Mutex<HashMap<u64, MergeResponse>>,
    // Call tracking, in call order
    calls: Mutex<Vec<String>>,
    statuses_calls: Mutex<Vec<u64>>,
    comments_calls: Mutex<Vec<u64>>,
    labels_calls: Mutex<Vec<u64>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    // Error injection
    error_on_merge_pr: Mutex<Option<String>>,
    error_on_list: Mutex<Option<String>>,
}

impl Default for MockRegistryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistryService {
    /// Create an empty mock
    pub fn new() -> Self {
        Self {
            open_prs: Mutex::new(Vec::new()),
            statuses_responses: Mutex::new(HashMap::new()),
            comments_responses: Mutex::new(HashMap::new()),
            labels_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            statuses_calls: Mutex::new(Vec::new()),
            comments_calls: Mutex::new(Vec::new()),
            labels_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            error_on_merge_pr: Mutex::new(None),
            error_on_list: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `merge_pr` return a transport error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_open_prs` fail
    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Set the PRs returned by `list_open_prs`
    pub fn set_open_prs(&self, prs: Vec<PullRequest>) {
        *self.open_prs.lock().unwrap() = prs;
    }

    /// Set the statuses listing for a PR
    pub fn set_statuses(&self, pr_number: u64, statuses: Vec<StatusEntry>) {
        self.statuses_responses
            .lock()
            .unwrap()
            .insert(pr_number, Paged::complete(statuses));
    }

    /// Set the comments listing for a PR
    pub fn set_comments(&self, pr_number: u64, comments: Vec<CommentEntry>) {
        self.comments_responses
            .lock()
            .unwrap()
            .insert(pr_number, Paged::complete(comments));
    }

    /// Set the labels listing for a PR
    pub fn set_labels(&self, pr_number: u64, labels: Vec<LabelEntry>) {
        self.labels_responses
            .lock()
            .unwrap()
            .insert(pr_number, Paged::complete(labels));
    }

    /// Make the statuses listing abort after yielding `partial`
    pub fn abort_statuses(&self, pr_number: u64, partial: Vec<StatusEntry>) {
        self.statuses_responses
            .lock()
            .unwrap()
            .insert(pr_number, Paged::aborted(partial, failure(pr_number, "statuses")));
    }

    /// Make the comments listing abort with nothing read
    pub fn abort_comments(&self, pr_number: u64) {
        self.comments_responses
            .lock()
            .unwrap()
            .insert(pr_number, Paged::aborted(vec![], failure(pr_number, "comments")));
    }

    /// Make the labels listing abort with nothing read
    pub fn abort_labels(&self, pr_number: u64) {
        self.labels_responses
            .lock()
            .unwrap()
            .insert(pr_number, Paged::aborted(vec![], failure(pr_number, "labels")));
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, response: MergeResponse) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, response);
    }

    /// Helper to make a PR pass the comment, CI and label gates
    pub fn setup_passing_signals(&self, pr_number: u64) {
        self.set_comments(pr_number, vec![]);
        self.set_statuses(pr_number, super::passing_statuses());
        self.set_labels(pr_number, vec![]);
    }

    // === Call verification methods ===

    /// Every gatherer/merge call as `"<kind>:<pr>"`, in call order
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Get all `statuses` calls
    pub fn get_statuses_calls(&self) -> Vec<u64> {
        self.statuses_calls.lock().unwrap().clone()
    }

    /// Get all `comments` calls
    pub fn get_comments_calls(&self) -> Vec<u64> {
        self.comments_calls.lock().unwrap().clone()
    }

    /// Get all `labels` calls
    pub fn get_labels_calls(&self) -> Vec<u64> {
        self.labels_calls.lock().unwrap().clone()
    }

    /// Get all `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Fetch counts as (comments, statuses, labels)
    pub fn fetch_counts(&self) -> (usize, usize, usize) {
        (
            self.comments_calls.lock().unwrap().len(),
            self.statuses_calls.lock().unwrap().len(),
            self.labels_calls.lock().unwrap().len(),
        )
    }

    /// Assert that `merge_pr` was called for a specific PR
    pub fn assert_merge_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) but got: {calls:?}"
        );
    }

    /// Assert that `merge_pr` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            !calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }

    /// Get count of merge_pr calls
    pub fn merge_call_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
    }

    fn record(&self, kind: &str, pr_number: u64) {
        self.calls.lock().unwrap().push(format!("{kind}:{pr_number}"));
    }
}

fn failure(pr_number: u64, what: &str) -> FetchFailure {
    FetchFailure {
        url: format!("https://api.github.com/mock/{pr_number}/{what}?page=2"),
        reason: "HTTP 502 Bad Gateway".to_string(),
    }
}

#[async_trait]
impl RegistryService for MockRegistryService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::FetchAborted {
                url: "https://api.github.com/mock/pulls".to_string(),
                reason: msg.clone(),
            });
        }
        Ok(self.open_prs.lock().unwrap().clone())
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        self.open_prs
            .lock()
            .unwrap()
            .iter()
            .find(|pr| pr.number == pr_number)
            .cloned()
            .ok_or_else(|| Error::FetchAborted {
                url: format!("https://api.github.com/mock/pulls/{pr_number}"),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }

    async fn statuses(&self, pr: &PullRequest) -> Result<Paged<StatusEntry>> {
        self.record("statuses", pr.number);
        self.statuses_calls.lock().unwrap().push(pr.number);
        let responses = self.statuses_responses.lock().unwrap();
        Ok(responses
            .get(&pr.number)
            .cloned()
            .unwrap_or_else(|| Paged::complete(vec![])))
    }

    async fn comments(&self, pr: &PullRequest) -> Result<Paged<CommentEntry>> {
        self.record("comments", pr.number);
        self.comments_calls.lock().unwrap().push(pr.number);
        let responses = self.comments_responses.lock().unwrap();
        Ok(responses
            .get(&pr.number)
            .cloned()
            .unwrap_or_else(|| Paged::complete(vec![])))
    }

    async fn labels(&self, pr: &PullRequest) -> Result<Paged<LabelEntry>> {
        self.record("labels", pr.number);
        self.labels_calls.lock().unwrap().push(pr.number);
        let responses = self.labels_responses.lock().unwrap();
        Ok(responses
            .get(&pr.number)
            .cloned()
            .unwrap_or_else(|| Paged::complete(vec![])))
    }

    async fn merge_pr(&self, pr: &PullRequest, commit: &MergeCommit) -> Result<MergeResponse> {
        self.record("merge", pr.number);
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            pr_number: pr.number,
            commit: commit.clone(),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::Transport(msg.clone()));
        }

        let responses = self.merge_responses.lock().unwrap();
        Ok(responses.get(&pr.number).cloned().unwrap_or(MergeResponse {
            status: 200,
            message: Some("Pull Request successfully merged".to_string()),
            sha: Some(format!("merged_sha_{}", pr.number)),
        }))
    }
}
