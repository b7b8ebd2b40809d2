//! Batch processing
//!
//! Walks a set of open PRs strictly in order, one request at a time:
//! evaluate, merge if mergeable, pause, move on. Counters live here and
//! nowhere else.

use crate::error::{Error, Result};
use crate::evaluate::evaluate;
use crate::merge::execute_merge;
use crate::platform::RegistryService;
use crate::rate_limit::RateLimiter;
use crate::types::{EvaluationOutcome, MergeResponse, PullRequest, RunCounters};
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Options for a batch run
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Count decisions without issuing merges
    pub dry_run: bool,
    /// Policy deciding whether a non-mergeable PR should be closed
    pub close_policy: ClosePolicy,
}

/// Close capability.
///
/// There is no close rule yet, so the only policy never applies. A future
/// rule becomes a new variant; the dispatch loop already counts closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Closing is not applicable to any PR
    #[default]
    NotApplicable,
}

impl ClosePolicy {
    /// Whether `pr` should be closed given how it evaluated
    pub const fn applies(&self, _pr: &PullRequest, _outcome: &EvaluationOutcome) -> bool {
        match self {
            Self::NotApplicable => false,
        }
    }
}

/// Callback for batch progress updates
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A PR was evaluated
    async fn on_evaluated(&self, pr: &PullRequest, outcome: &EvaluationOutcome);

    /// A merge request was answered
    async fn on_merge_response(&self, pr: &PullRequest, response: &MergeResponse);

    /// A non-fatal error was logged for a PR
    async fn on_error(&self, pr: &PullRequest, error: &Error);
}

/// Progress callback that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_evaluated(&self, _pr: &PullRequest, _outcome: &EvaluationOutcome) {}

    async fn on_merge_response(&self, _pr: &PullRequest, _response: &MergeResponse) {}

    async fn on_error(&self, _pr: &PullRequest, _error: &Error) {}
}

/// Evaluate and merge each PR in `prs`, in order.
///
/// Non-fatal errors (transport failures, rejected merges, a PR body
/// without a version token) are logged and the batch continues. Fatal
/// errors (see [`Error::is_fatal`]) stop the batch and are returned.
pub async fn process_batch(
    service: &dyn RegistryService,
    prs: &[PullRequest],
    options: &DispatchOptions,
    limiter: &RateLimiter,
    progress: &dyn ProgressCallback,
) -> Result<RunCounters> {
    let mut counters = RunCounters::default();

    for pr in prs {
        let now = limiter.clock().now();
        let mut outcome = match evaluate(service, pr, now).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_fatal() => {
                error!(pr_number = pr.number, error = %e, "evaluation aborted");
                return Err(e);
            }
            Err(e) => {
                warn!(pr_number = pr.number, error = %e, "evaluation failed");
                progress.on_error(pr, &e).await;
                continue;
            }
        };

        if !outcome.is_mergeable() && options.close_policy.applies(pr, &outcome) {
            outcome = EvaluationOutcome::Closeable;
        }
        progress.on_evaluated(pr, &outcome).await;

        match outcome {
            EvaluationOutcome::Mergeable(kind) => {
                counters.merges_attempted += 1;
                if options.dry_run {
                    info!(pr_number = pr.number, %kind, title = %pr.title, "would merge (dry run)");
                    continue;
                }

                match execute_merge(service, pr).await {
                    Ok(response) => {
                        progress.on_merge_response(pr, &response).await;
                        match response.into_result(pr.number) {
                            Ok(_) => counters.merges_succeeded += 1,
                            Err(e) => {
                                warn!(error = %e, "merge failed");
                                progress.on_error(pr, &e).await;
                            }
                        }
                    }
                    Err(e @ Error::MissingVersionToken(_)) => {
                        // Nothing was sent, so no pause is owed
                        error!(pr_number = pr.number, error = %e, "cannot build merge commit");
                        progress.on_error(pr, &e).await;
                        continue;
                    }
                    Err(e) if e.is_fatal() => {
                        error!(pr_number = pr.number, error = %e, "merge aborted");
                        return Err(e);
                    }
                    Err(e) => {
                        warn!(pr_number = pr.number, error = %e, "merge request failed");
                        progress.on_error(pr, &e).await;
                    }
                }
                limiter.pause().await;
            }
            EvaluationOutcome::Closeable => {
                // No close endpoint is wired up; only the count is kept
                counters.closes_attempted += 1;
                info!(pr_number = pr.number, "closeable, but closing is not supported");
            }
            other => {
                debug!(pr_number = pr.number, outcome = %other, "no action");
            }
        }
    }

    info!(
        merges_succeeded = counters.merges_succeeded,
        merges_attempted = counters.merges_attempted,
        closes_succeeded = counters.closes_succeeded,
        closes_attempted = counters.closes_attempted,
        dry_run = options.dry_run,
        "batch complete"
    );
    Ok(counters)
}

/// List the open PRs of the configured repository and process them
pub async fn run_for_repository(
    service: &dyn RegistryService,
    options: &DispatchOptions,
    limiter: &RateLimiter,
    progress: &dyn ProgressCallback,
) -> Result<RunCounters> {
    let prs = service.list_open_prs().await?;
    info!(count = prs.len(), dry_run = options.dry_run, "processing open PRs");
    process_batch(service, &prs, options, limiter, progress).await
}
