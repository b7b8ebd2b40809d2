//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{MergePrCall, MockRegistryService};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use registry_automerge::evaluate::{REQUIRED_CONTEXTS, TRUSTED_BOT};
use registry_automerge::rate_limit::{Clock, RateLimiter};
use registry_automerge::types::{
    CommentEntry, LabelEntry, PrLinks, PullRequest, StatusEntry, StatusState,
};
use std::sync::{Arc, Mutex};

/// Fixed "current time" used by evaluation tests
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 6, 15, 12, 0, 0).unwrap()
}

/// Bot-authored PR opened `age` before [`fixed_now`]
pub fn make_pr(number: u64, title: &str, age: Duration) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: Some(format!(
            "Repository: JuliaLang/Pkg{number}.jl\nRelease: (v1.2.{number})\nDiff: [vs v1.2.0](https://github.com/JuliaLang/Pkg{number}.jl/compare)"
        )),
        author: TRUSTED_BOT.to_string(),
        created_at: fixed_now() - age,
        base_repo: "JuliaLang/METADATA.jl".to_string(),
        links: PrLinks {
            statuses: format!("https://api.github.com/repos/JuliaLang/METADATA.jl/statuses/sha{number}"),
            comments: format!("https://api.github.com/repos/JuliaLang/METADATA.jl/issues/{number}/comments"),
            issue: format!("https://api.github.com/repos/JuliaLang/METADATA.jl/issues/{number}"),
        },
    }
}

/// Same as [`make_pr`] but authored by `author`
pub fn make_pr_by(number: u64, title: &str, author: &str) -> PullRequest {
    PullRequest {
        author: author.to_string(),
        ..make_pr(number, title, Duration::days(10))
    }
}

/// Both required contexts successful, plus some noise
pub fn passing_statuses() -> Vec<StatusEntry> {
    vec![
        status(REQUIRED_CONTEXTS[0], StatusState::Pending),
        status(REQUIRED_CONTEXTS[0], StatusState::Success),
        status("ci/coverage", StatusState::Failure),
        status(REQUIRED_CONTEXTS[1], StatusState::Success),
    ]
}

pub fn status(context: &str, state: StatusState) -> StatusEntry {
    StatusEntry {
        context: context.to_string(),
        state,
    }
}

pub fn comment(id: u64, author: &str) -> CommentEntry {
    CommentEntry {
        id,
        author: author.to_string(),
        body: format!("comment {id}"),
    }
}

pub fn label(name: &str) -> LabelEntry {
    LabelEntry {
        name: name.to_string(),
    }
}

/// Clock frozen at [`fixed_now`] that records sleeps instead of waiting
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<std::time::Duration>>,
}

impl RecordingClock {
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }

    pub fn sleeps(&self) -> Vec<std::time::Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        fixed_now()
    }

    async fn sleep(&self, duration: std::time::Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Ten-second limiter over a fresh [`RecordingClock`]
pub fn recording_limiter() -> (RateLimiter, Arc<RecordingClock>) {
    let clock = Arc::new(RecordingClock::default());
    let limiter = RateLimiter::new(std::time::Duration::from_secs(10), clock.clone());
    (limiter, clock)
}
