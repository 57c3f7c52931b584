// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! stagehand - staged CI pipeline runner
//!
//! Runs build, test, scan and deploy stages in order and exits with
//! 0 (SUCCESS), 2 (UNSTABLE) or 1 (FAILURE).

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stagehand::cli::run::RunArgs;
use stagehand::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagehand=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { force, output } => {
            stagehand::cli::init::run(output, force, cli.verbose).await
        }
        Commands::Run {
            pipeline,
            build_id,
            image,
            stage,
            dry_run,
            no_archive,
        } => {
            let args = RunArgs {
                pipeline,
                build_id,
                image,
                stages: stage,
                dry_run,
                no_archive,
            };
            let outcome = stagehand::cli::run::run(args, cli.verbose).await?;
            std::process::exit(outcome.exit_code());
        }
        Commands::Validate { pipeline } => {
            stagehand::cli::validate::run(pipeline, cli.verbose).await
        }
        Commands::Plan { pipeline, format } => {
            stagehand::cli::plan::run(pipeline, format, cli.verbose).await
        }
    }
}
