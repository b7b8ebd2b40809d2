//! registry-automerge: automatic merging of package-registration PRs
//!
//! Open PRs on the registry repository are checked against a fixed set of
//! gates (bot author, no comments, green CI, no labels, title shape and
//! cooldown). PRs that pass are squash-merged one at a time with a fixed
//! pause between merges.
//!
//! The pieces, leaf to root:
//! - [`platform::pagination`] - `Link` header parsing and page traversal
//! - [`platform::RegistryService`] - statuses/comments/labels/merge calls
//! - [`evaluate`] - the gate pipeline
//! - [`merge`] - squash commit construction and the merge request
//! - [`dispatch`] - the batch loop and its counters

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod evaluate;
pub mod merge;
pub mod platform;
pub mod rate_limit;
pub mod types;
pub mod webhook;
