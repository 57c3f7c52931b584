// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Run command - execute the pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::artifacts::ArtifactArchiver;
use crate::build_id::BuildCounter;
use crate::errors::{RecoverySuggestion, StagehandError};
use crate::pipeline::{
    BuildOutcome, PipelineRunner, PipelineValidator, RunContext, RunOptions, REPORT_FILE,
};

/// Arguments of the run command
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub pipeline: PathBuf,
    pub build_id: Option<u64>,
    pub image: Option<String>,
    pub stages: Vec<String>,
    pub dry_run: bool,
    pub no_archive: bool,
}

/// Run the pipeline and return the build outcome
pub async fn run(args: RunArgs, verbose: bool) -> Result<BuildOutcome> {
    let mut pipeline = super::load_pipeline(&args.pipeline)?;

    let validation = PipelineValidator::validate(&pipeline)?;

    if !validation.is_valid() {
        eprintln!("{}", "Pipeline validation failed:".red().bold());
        for error in &validation.errors {
            eprintln!("  {} {}", "✗".red(), error);
        }
        return Err(StagehandError::InvalidPipeline {
            reason: format!(
                "{} error(s) in {}",
                validation.errors.len(),
                args.pipeline.display()
            ),
            help: Some("Run 'stagehand validate' for details".into()),
        }
        .into());
    }

    if validation.has_warnings() && verbose {
        eprintln!("{}", "Pipeline warnings:".yellow().bold());
        for warning in &validation.warnings {
            eprintln!("  {} {}", "⚠".yellow(), warning);
        }
        eprintln!();
    }

    if let Some(image) = args.image {
        pipeline.settings.image = Some(image);
    }

    let runner = PipelineRunner::with_default_executors();

    // A missing tool fails its stages, which the run records; warn and carry on
    let missing_tools = runner.check_tools(&pipeline).await;
    if !missing_tools.is_empty() {
        eprintln!("{}", "Missing tools:".yellow().bold());
        for tool in &missing_tools {
            eprintln!("  {} {}", "⚠".yellow(), StagehandError::tool_not_found(tool));
            if verbose {
                eprintln!("{}", RecoverySuggestion::install_tool(tool).to_string().dimmed());
            }
        }
        eprintln!();
    }

    let run_dir = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let counter = BuildCounter::default_counter(&run_dir);
    let build_id = match args.build_id {
        Some(id) if args.dry_run => id,
        Some(id) => {
            counter.observe(id)?;
            id
        }
        None if args.dry_run => counter.current()? + 1,
        None => counter.next()?,
    };

    let ctx = RunContext::new(&pipeline, run_dir, build_id);
    let options = RunOptions {
        dry_run: args.dry_run,
        stages: args.stages,
        verbose,
        skip_archive: args.no_archive,
    };

    let report = runner.run(&pipeline, &ctx, &options).await?;

    if !options.dry_run && !options.skip_archive {
        let archiver = ArtifactArchiver::new(
            ctx.resolve(&pipeline.settings.archive_dir),
            ctx.run_dir.clone(),
        );
        let report_path = archiver.build_dir(build_id).join(REPORT_FILE);
        println!("{}", format!("Report: {}", report_path.display()).dimmed());
    }

    Ok(report.outcome)
}
