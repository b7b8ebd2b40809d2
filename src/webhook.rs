//! Routing of inbound `status` webhook events
//!
//! The HTTP listener lives outside this crate. It hands over the event kind
//! (the `X-GitHub-Event` header) and the JSON payload; [`route_event`]
//! decides whether a batch run should start and what status to answer with.

use crate::error::Result;
use serde::Deserialize;
use tracing::{debug, warn};

/// The only event kind the bot reacts to
pub const STATUS_EVENT: &str = "status";

/// CI state that triggers a run
const SUCCESS_STATE: &str = "success";

/// Fields of a `status` event payload the router reads
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusPayload {
    /// Full name of the repository the status belongs to
    pub name: String,
    /// `success`, `pending`, `failure` or `error`
    pub state: String,
}

/// A parsed webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    /// Event kind from the delivery headers
    pub kind: String,
    /// Parsed payload
    pub payload: StatusPayload,
}

impl StatusEvent {
    /// Parse a delivery body for an event of `kind`
    pub fn from_json(kind: &str, body: &str) -> Result<Self> {
        Ok(Self {
            kind: kind.to_string(),
            payload: serde_json::from_str(body)?,
        })
    }
}

/// What the listener should do with a delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    /// Run the dispatch loop for the target repository
    Dispatch,
    /// Nothing to do, acknowledge
    Acknowledge,
    /// Delivery was not meant for this bot
    Reject(String),
}

impl WebhookAction {
    /// HTTP status the listener answers with
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Reject(_) => 500,
            Self::Dispatch | Self::Acknowledge => 200,
        }
    }
}

/// Decide how to handle `event` for `target_repo`
pub fn route_event(event: &StatusEvent, target_repo: &str) -> WebhookAction {
    if event.kind != STATUS_EVENT {
        warn!(kind = %event.kind, "unexpected event kind");
        return WebhookAction::Reject(format!("unexpected event kind {:?}", event.kind));
    }
    if event.payload.name != target_repo {
        warn!(repository = %event.payload.name, "status for a different repository");
        return WebhookAction::Reject(format!(
            "status for {:?}, expected {target_repo:?}",
            event.payload.name
        ));
    }

    if event.payload.state == SUCCESS_STATE {
        debug!(repository = %event.payload.name, "CI success, dispatching");
        WebhookAction::Dispatch
    } else {
        debug!(state = %event.payload.state, "CI not successful, nothing to do");
        WebhookAction::Acknowledge
    }
}
