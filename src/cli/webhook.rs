//! Webhook command - handle one delivery handed over by the listener

use crate::cli::context::{CommandContext, Overrides};
use crate::cli::run::print_summary;
use crate::cli::style::Stylize;
use anstream::println;
use registry_automerge::config::Config;
use registry_automerge::dispatch::{DispatchOptions, NoopProgress, run_for_repository};
use registry_automerge::error::{Error, Result};
use registry_automerge::webhook::{StatusEvent, WebhookAction, route_event};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

/// Route the delivery and run a batch if it asks for one.
///
/// Prints the HTTP status the listener should answer with; a rejected
/// delivery exits non-zero.
pub async fn run_webhook(
    overrides: &Overrides,
    kind: &str,
    payload: &Path,
    dry_run: bool,
) -> Result<ExitCode> {
    let body = fs::read_to_string(payload)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", payload.display())))?;
    let event = StatusEvent::from_json(kind, &body)?;

    // Routing needs only the repository; credentials are resolved on dispatch
    let mut config = Config::load(overrides.config.as_deref())?;
    if let Some(ref repository) = overrides.repository {
        config.repository.clone_from(repository);
    }

    let action = route_event(&event, &config.repository);
    println!("{}", action.http_status());

    match action {
        WebhookAction::Reject(reason) => {
            println!("{} {reason}", "Rejected:".warn());
            Ok(ExitCode::FAILURE)
        }
        WebhookAction::Acknowledge => {
            info!(state = %event.payload.state, "acknowledged");
            Ok(ExitCode::SUCCESS)
        }
        WebhookAction::Dispatch => {
            let ctx = CommandContext::new(overrides)?;
            let options = DispatchOptions {
                dry_run,
                ..DispatchOptions::default()
            };
            let counters =
                run_for_repository(ctx.service.as_ref(), &options, &ctx.limiter, &NoopProgress)
                    .await?;
            print_summary(&counters, dry_run);
            Ok(ExitCode::SUCCESS)
        }
    }
}
