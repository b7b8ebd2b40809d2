//! CLI commands

pub mod context;
pub mod run;
pub mod style;
pub mod webhook;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use registry_automerge::dispatch::ProgressCallback;
use registry_automerge::error::Error;
use registry_automerge::types::{EvaluationOutcome, MergeResponse, PullRequest};
use style::Stylize;

/// Progress bar over a batch, one line per decision
pub struct CliProgress {
    bar: ProgressBar,
    dry_run: bool,
}

impl CliProgress {
    /// Progress over `total` PRs
    pub fn new(total: usize, dry_run: bool) -> Self {
        let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar, dry_run }
    }

    /// Remove the bar once the batch is done
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_evaluated(&self, pr: &PullRequest, outcome: &EvaluationOutcome) {
        self.bar.inc(1);
        self.bar.set_message(format!("PR #{}", pr.number));
        let line = match outcome {
            EvaluationOutcome::Mergeable(_) if self.dry_run => {
                format!("{} PR #{}: {}", "✓ Would merge".success(), pr.number, pr.title)
            }
            EvaluationOutcome::Mergeable(_) => {
                format!("{} PR #{}: {}", "🔀 Merging".accent(), pr.number, pr.title)
            }
            EvaluationOutcome::SkippedNotBotAuthored => return,
            other => format!(
                "  {} PR #{} ({})",
                "skip".muted(),
                pr.number,
                other.to_string().muted()
            ),
        };
        self.bar.println(line);
    }

    async fn on_merge_response(&self, pr: &PullRequest, response: &MergeResponse) {
        if response.is_success() {
            let sha = response.sha.as_deref().unwrap_or("(no sha)");
            self.bar
                .println(format!("  {} #{} {}", "✅ Merged".success(), pr.number, sha.muted()));
        }
    }

    async fn on_error(&self, pr: &PullRequest, error: &Error) {
        self.bar
            .println(format!("  {} #{}: {}", "⚠️  Failed".warn(), pr.number, error));
    }
}
