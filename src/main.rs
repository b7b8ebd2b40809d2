//! `automerge` - merge bot for package-registration pull requests

mod cli;

use clap::{Parser, Subcommand};
use cli::style::Stylize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Automatic merging of package-registration pull requests
#[derive(Parser, Debug)]
#[command(name = "automerge", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Target repository (`owner/repo`), overrides the config file
    #[arg(long, global = true)]
    repository: Option<String>,

    /// Account the bot acts as, overrides the config file
    #[arg(long, global = true)]
    username: Option<String>,

    /// Log filter (`RUST_LOG` takes precedence)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate every open PR and merge the ready ones
    Run {
        /// Show what would be merged without merging
        #[arg(long)]
        dry_run: bool,
    },
    /// Evaluate a single PR and print the outcome
    Check {
        /// PR number
        pr_number: u64,
    },
    /// Handle one webhook delivery read from a file
    Webhook {
        /// Event kind (the `X-GitHub-Event` header)
        #[arg(long, default_value = "status")]
        event: String,
        /// File containing the JSON payload
        #[arg(long)]
        payload: PathBuf,
        /// Show what would be merged without merging
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let overrides = cli::context::Overrides {
        config: cli.config,
        repository: cli.repository,
        username: cli.username,
    };

    let result = match cli.command {
        Commands::Run { dry_run } => cli::run::run_batch(&overrides, dry_run).await,
        Commands::Check { pr_number } => cli::run::run_check(&overrides, pr_number).await,
        Commands::Webhook {
            event,
            payload,
            dry_run,
        } => cli::webhook::run_webhook(&overrides, &event, &payload, dry_run).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            anstream::eprintln!("{} {e}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
