//! Run and check commands

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, Overrides};
use crate::cli::style::Stylize;
use anstream::println;
use registry_automerge::dispatch::{DispatchOptions, process_batch};
use registry_automerge::error::Result;
use registry_automerge::evaluate::evaluate;
use registry_automerge::merge::build_merge_commit;
use registry_automerge::types::{EvaluationOutcome, RunCounters};
use std::process::ExitCode;

/// Evaluate all open PRs and merge the ready ones
pub async fn run_batch(overrides: &Overrides, dry_run: bool) -> Result<ExitCode> {
    let ctx = CommandContext::new(overrides)?;

    println!(
        "{}",
        format!("Listing open PRs on {}...", ctx.config.repository).muted()
    );
    let prs = ctx.service.list_open_prs().await?;
    if prs.is_empty() {
        println!("{}", "No open PRs.".muted());
        return Ok(ExitCode::SUCCESS);
    }

    let options = DispatchOptions {
        dry_run,
        ..DispatchOptions::default()
    };
    let progress = CliProgress::new(prs.len(), dry_run);
    let counters = process_batch(
        ctx.service.as_ref(),
        &prs,
        &options,
        &ctx.limiter,
        &progress,
    )
    .await;
    progress.finish();

    let counters = counters?;
    print_summary(&counters, dry_run);
    Ok(ExitCode::SUCCESS)
}

/// Evaluate one PR and print the outcome without merging
pub async fn run_check(overrides: &Overrides, pr_number: u64) -> Result<ExitCode> {
    let ctx = CommandContext::new(overrides)?;
    let pr = ctx.service.get_pr(pr_number).await?;

    println!("{} #{}: {}", "PR".emphasis(), pr.number, pr.title.accent());
    println!("  Author:  {}", pr.author);
    println!("  Opened:  {}", pr.created_at);

    let outcome = evaluate(ctx.service.as_ref(), &pr, ctx.limiter.clock().now()).await?;
    match outcome {
        EvaluationOutcome::Mergeable(_) => {
            println!("  Outcome: {}", outcome.to_string().success());
            let commit = build_merge_commit(&pr)?;
            println!("  Commit:  {}", commit.commit_title.muted());
        }
        ref other => println!("  Outcome: {}", other.to_string().warn()),
    }
    if let Some(failure) = outcome.fetch_failure() {
        println!("  {} {failure}", "Fetch failed:".warn());
    }
    Ok(ExitCode::SUCCESS)
}

/// Print merge summary
pub fn print_summary(counters: &RunCounters, dry_run: bool) {
    println!();
    if dry_run {
        println!(
            "{} {} PR(s) ready to merge",
            "Dry run:".emphasis(),
            counters.merges_attempted.to_string().accent()
        );
        println!("{}", "Run without --dry-run to execute.".muted());
        return;
    }
    println!(
        "{} merged {}/{}, closed {}/{}",
        "Done:".emphasis(),
        counters.merges_succeeded.to_string().success(),
        counters.merges_attempted,
        counters.closes_succeeded,
        counters.closes_attempted
    );
}
