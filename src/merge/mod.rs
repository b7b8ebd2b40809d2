//! Merge executor
//!
//! Two steps matching the rest of the pipeline:
//! 1. Commit - build the squash commit title/message (pure, testable)
//! 2. Execute - send the merge request (effectful)

mod commit;
mod execute;

pub use commit::{MERGE_COMMIT_MESSAGE, MERGE_METHOD, build_merge_commit, extract_version_token};
pub use execute::execute_merge;
