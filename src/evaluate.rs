//! Mergeability gates
//!
//! A PR is checked against five gates in order. The first failing gate
//! decides the outcome and later gates are never run, so the cheap author
//! check guards the paginated fetches behind it.
//!
//! 1. Author is the registry bot
//! 2. No comments, or the bot commented last
//! 3. Both required CI contexts report success
//! 4. No labels
//! 5. Title shape (and the cooldown for new registrations)

use crate::error::{Error, Result};
use crate::platform::RegistryService;
use crate::types::{
    Basis, CommentEntry, EvaluationOutcome, LabelEntry, Paged, PullRequest, ReleaseKind,
    StatusEntry, StatusState, TitleClass,
};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Login of the bot that opens registry PRs
pub const TRUSTED_BOT: &str = "attobot";

/// CI contexts that must both report success
pub const REQUIRED_CONTEXTS: [&str; 2] = [
    "continuous-integration/travis-ci/pr",
    "continuous-integration/appveyor/pr",
];

/// Minimum age of a new-package registration, in days
pub const REGISTRATION_COOLDOWN_DAYS: i64 = 3;

static TAG_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Tag (\S+)\.jl v(\d+\.\d+\.\d+\S*)$").expect("tag title pattern is valid")
});

static REGISTER_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Register new package (\S+)\.jl v(\d+\.\d+\.\d+\S*)$")
        .expect("registration title pattern is valid")
});

/// Cooldown applied to new registrations
pub fn registration_cooldown() -> Duration {
    Duration::days(REGISTRATION_COOLDOWN_DAYS)
}

/// Gate names, for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// PR author check
    Author,
    /// Comment check
    Comments,
    /// CI status check
    Ci,
    /// Label check
    Labels,
    /// Title shape and cooldown
    Title,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Author => write!(f, "author"),
            Self::Comments => write!(f, "comments"),
            Self::Ci => write!(f, "ci"),
            Self::Labels => write!(f, "labels"),
            Self::Title => write!(f, "title"),
        }
    }
}

/// Classify a PR title as a release tag, a new registration, or neither
pub fn classify_title(title: &str) -> TitleClass {
    let title = title.trim();
    if let Some(caps) = TAG_TITLE.captures(title) {
        return TitleClass::ReleaseTag {
            package: caps[1].to_string(),
            version: caps[2].to_string(),
        };
    }
    if let Some(caps) = REGISTER_TITLE.captures(title) {
        return TitleClass::Registration {
            package: caps[1].to_string(),
            version: caps[2].to_string(),
        };
    }
    TitleClass::Unrecognized
}

/// Comment gate rule: nothing said, or the bot had the last word.
///
/// "Last" means last in fetch order; the API returns comments oldest first.
pub fn comments_cleared(comments: &[CommentEntry]) -> bool {
    comments
        .last()
        .is_none_or(|comment| comment.author == TRUSTED_BOT)
}

/// CI gate rule: every required context has a `success` entry
pub fn required_contexts_passed(statuses: &[StatusEntry]) -> bool {
    let succeeded: HashSet<&str> = statuses
        .iter()
        .filter(|status| status.state == StatusState::Success)
        .map(|status| status.context.as_str())
        .collect();
    REQUIRED_CONTEXTS
        .iter()
        .all(|context| succeeded.contains(context))
}

/// Label gate rule: any label blocks
pub const fn labels_clear(labels: &[LabelEntry]) -> bool {
    labels.is_empty()
}

/// Run a fetched gate: an aborted fetch blocks regardless of `rule`
fn check_paged<T>(
    pr: &PullRequest,
    gate: Gate,
    paged: &Paged<T>,
    rule: impl FnOnce(&[T]) -> bool,
) -> Option<Basis> {
    if let Some(failure) = &paged.failure {
        warn!(
            pr_number = pr.number,
            %gate,
            %failure,
            "could not fetch gate data, treating gate as failed"
        );
        return Some(Basis::FetchAborted(failure.clone()));
    }
    if rule(&paged.entries) {
        None
    } else {
        debug!(pr_number = pr.number, %gate, "gate failed");
        Some(Basis::Observed)
    }
}

/// Evaluate `pr` as of `now`.
///
/// Fetch failures are folded into the outcome as [`Basis::FetchAborted`].
/// A bot-authored PR whose title matches neither known shape is an error:
/// it means the bot produced something this pipeline does not understand.
pub async fn evaluate(
    service: &dyn RegistryService,
    pr: &PullRequest,
    now: DateTime<Utc>,
) -> Result<EvaluationOutcome> {
    let title_class = classify_title(&pr.title);

    if pr.author != TRUSTED_BOT {
        debug!(
            pr_number = pr.number,
            gate = %Gate::Author,
            author = %pr.author,
            "not authored by registry bot"
        );
        return Ok(EvaluationOutcome::SkippedNotBotAuthored);
    }

    let comments = service.comments(pr).await?;
    if let Some(basis) = check_paged(pr, Gate::Comments, &comments, comments_cleared) {
        return Ok(EvaluationOutcome::SkippedHasComments(basis));
    }

    let statuses = service.statuses(pr).await?;
    if let Some(basis) = check_paged(pr, Gate::Ci, &statuses, required_contexts_passed) {
        return Ok(EvaluationOutcome::SkippedTestsIncomplete(basis));
    }

    let labels = service.labels(pr).await?;
    if let Some(basis) = check_paged(pr, Gate::Labels, &labels, labels_clear) {
        return Ok(EvaluationOutcome::SkippedHasLabels(basis));
    }

    match title_class {
        TitleClass::ReleaseTag { package, version } => {
            debug!(pr_number = pr.number, %package, %version, "release tag ready");
            Ok(EvaluationOutcome::Mergeable(ReleaseKind::Tag))
        }
        TitleClass::Registration { package, version } => {
            let age = pr.age(now);
            if age >= registration_cooldown() {
                debug!(pr_number = pr.number, %package, %version, "registration ready");
                Ok(EvaluationOutcome::Mergeable(ReleaseKind::Registration))
            } else {
                debug!(
                    pr_number = pr.number,
                    gate = %Gate::Title,
                    %package,
                    age_hours = age.num_hours(),
                    "registration inside cooldown"
                );
                Ok(EvaluationOutcome::SkippedTooYoung { age })
            }
        }
        TitleClass::Unrecognized => Err(Error::UnexpectedTitleShape {
            number: pr.number,
            title: pr.title.clone(),
        }),
    }
}
