// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Pipeline runner
//!
//! Runs stages strictly in declaration order, folds their results into a
//! `BuildOutcome`, then always runs cleanup, archiving, the report and
//! notifications.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use colored::Colorize;

use crate::artifacts::ArtifactArchiver;
use crate::errors::StagehandError;
use crate::executors::{create_default_executors, run_shell, ExecutionResult, Executor};
use crate::notify::{dispatch, notifiers_for, Notification};
use crate::pipeline::{
    truncate_output, Action, BuildOutcome, CleanupAction, CleanupResult, Pipeline, RunContext,
    RunReport, Stage, StageResult, StageStatus,
};
use crate::utils::{
    create_spinner, outcome_style, print_section, print_success, print_warning,
};

/// Report file name inside a build's archive directory
pub const REPORT_FILE: &str = "report.json";

/// Pipeline run options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only show what would be done
    pub dry_run: bool,
    /// Only run specific stages
    pub stages: Vec<String>,
    /// Verbose output
    pub verbose: bool,
    /// Do not archive artifacts or write the report
    pub skip_archive: bool,
}

/// Pipeline runner
pub struct PipelineRunner {
    /// Registered executors by action kind
    executors: HashMap<String, Arc<dyn Executor>>,
}

impl PipelineRunner {
    /// Create a runner with no executors
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// Create a runner with the built-in shell, probe and notice executors
    pub fn with_default_executors() -> Self {
        let mut runner = Self::new();
        for (name, executor) in create_default_executors() {
            runner.register_executor(&name, executor);
        }
        runner
    }

    /// Register an executor for an action kind
    pub fn register_executor(&mut self, name: &str, executor: Box<dyn Executor>) {
        self.executors.insert(name.to_string(), Arc::from(executor));
    }

    /// Run a pipeline
    ///
    /// Only an unknown stage name in `options.stages` is an error. Everything
    /// that goes wrong once stages start is recorded in the report instead.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        ctx: &RunContext,
        options: &RunOptions,
    ) -> Result<RunReport, StagehandError> {
        let started_at = SystemTime::now();
        let start = Instant::now();

        let selected = select_stages(pipeline, &options.stages)?;
        self.print_execution_plan(pipeline, &selected, ctx);

        if options.dry_run {
            return Ok(RunReport {
                pipeline: pipeline.name.clone(),
                build_id: ctx.build_id,
                outcome: BuildOutcome::Success,
                stages: vec![],
                skipped: vec![],
                cleanup: vec![],
                artifacts: vec![],
                started_at,
                duration: start.elapsed(),
            });
        }

        tracing::info!(pipeline = %pipeline.name, build_id = ctx.build_id, "starting run");

        let mut outcome = BuildOutcome::Success;
        let mut results = Vec::with_capacity(selected.len());
        let mut skipped = Vec::new();

        for (idx, stage) in selected.iter().enumerate() {
            let result = self
                .run_stage(stage, ctx, pipeline.settings.output_limit, options.verbose)
                .await;
            let failed = !result.status.is_ok();
            results.push(result);

            if failed {
                outcome = outcome.downgrade(stage.on_failure.outcome());

                if stage.on_failure.stops_run() {
                    skipped = selected[idx + 1..].iter().map(|s| s.name.clone()).collect();
                    tracing::warn!(
                        stage = %stage.name,
                        skipped = skipped.len(),
                        "stage failed with abort policy, stopping"
                    );
                    break;
                }
            }
        }

        let cleanup = self.run_cleanup(&pipeline.cleanup, ctx).await;

        let archiver = ArtifactArchiver::new(
            ctx.resolve(&pipeline.settings.archive_dir),
            ctx.run_dir.clone(),
        );
        let artifacts = if options.skip_archive {
            vec![]
        } else {
            archiver.archive(&pipeline.artifacts, ctx.build_id).await
        };

        let report = RunReport {
            pipeline: pipeline.name.clone(),
            build_id: ctx.build_id,
            outcome,
            stages: results,
            skipped,
            cleanup,
            artifacts,
            started_at,
            duration: start.elapsed(),
        };

        if !options.skip_archive {
            let path = archiver.build_dir(ctx.build_id).join(REPORT_FILE);
            if let Err(e) = report.write_json(&path).await {
                tracing::warn!(error = %e, "failed to write run report");
            }
        }

        self.print_summary(&report);

        let notification = Notification::render(&pipeline.notifications, outcome, ctx);
        dispatch(&notifiers_for(&pipeline.notifications, ctx), &notification).await;

        tracing::info!(pipeline = %pipeline.name, %outcome, "run finished");

        Ok(report)
    }

    /// Run one stage; never fails, faults become `StageStatus::Fault`
    async fn run_stage(
        &self,
        stage: &Stage,
        ctx: &RunContext,
        output_limit: usize,
        verbose: bool,
    ) -> StageResult {
        let start = Instant::now();

        if stage.delay_secs > 0 {
            let pb = create_spinner(&format!(
                "waiting {}s before {}",
                stage.delay_secs, stage.name
            ));
            tokio::time::sleep(Duration::from_secs(stage.delay_secs)).await;
            pb.finish_and_clear();
        }

        let pb = create_spinner(&format!("{}...", stage.name));
        let outcome = self.execute_stage(stage, ctx).await;
        pb.finish_and_clear();

        let (status, output) = match outcome {
            Ok(result) if result.success => (StageStatus::Ok, result.combined_output()),
            Ok(result) => (
                StageStatus::NonZero {
                    exit_code: result.exit_code,
                },
                result.combined_output(),
            ),
            Err(e) => {
                if !e.is_stage_fault() {
                    tracing::error!(stage = %stage.name, error = %e, "unexpected error while running stage");
                }
                (
                    StageStatus::Fault {
                        message: e.to_string(),
                    },
                    String::new(),
                )
            }
        };

        let duration = start.elapsed();
        let output = truncate_output(&output, output_limit);

        match status {
            StageStatus::Ok => {
                println!(
                    "  {} {} ({:.2}s)",
                    "✓".green(),
                    stage.name.bold(),
                    duration.as_secs_f64()
                );
                tracing::debug!(stage = %stage.name, "stage succeeded");
            }
            ref failed => {
                println!(
                    "  {} {} {}",
                    "✗".red(),
                    stage.name.bold(),
                    format!("({}, policy: {})", failed, stage.on_failure).dimmed()
                );
                tracing::warn!(stage = %stage.name, status = %failed, "stage failed");

                if verbose {
                    if let Some(ref out) = output {
                        eprintln!("{}", out.dimmed());
                    }
                }
            }
        }

        StageResult {
            name: stage.name.clone(),
            status,
            output,
            duration,
        }
    }

    /// Dispatch to the executor, applying the stage timeout
    ///
    /// The action runs in its own task so a panicking executor is recorded as
    /// a fault instead of unwinding through the run.
    async fn execute_stage(
        &self,
        stage: &Stage,
        ctx: &RunContext,
    ) -> Result<ExecutionResult, StagehandError> {
        let kind = stage.action_kind();
        let executor = self
            .executors
            .get(kind)
            .map(Arc::clone)
            .ok_or_else(|| StagehandError::ExecutorNotFound {
                action: kind.to_string(),
            })?;

        let env = ctx.stage_env(stage);
        let working_dir = ctx.working_dir(stage);
        let owned = stage.clone();
        let task =
            tokio::spawn(async move { executor.execute(&owned, &working_dir, &env).await });
        let abort = task.abort_handle();

        let joined = async {
            task.await.unwrap_or_else(|e| {
                Err(StagehandError::StagePanicked {
                    stage: stage.name.clone(),
                    message: panic_message(e),
                })
            })
        };

        let Some(seconds) = stage.timeout_secs else {
            return joined.await;
        };

        match tokio::time::timeout(Duration::from_secs(seconds), joined).await {
            Ok(result) => result,
            Err(_) => {
                // Dropping the action kills any child process it started
                abort.abort();
                Err(StagehandError::StageTimedOut {
                    stage: stage.name.clone(),
                    seconds,
                })
            }
        }
    }

    /// Run every cleanup action; each one is isolated from the others
    async fn run_cleanup(
        &self,
        actions: &[CleanupAction],
        ctx: &RunContext,
    ) -> Vec<CleanupResult> {
        if actions.is_empty() {
            return vec![];
        }

        print_section("Cleanup");

        let mut results = Vec::with_capacity(actions.len());

        for action in actions {
            let error = match run_shell(&action.shell, &action.command, &ctx.run_dir, ctx.vars()).await
            {
                Ok(result) if result.success => None,
                Ok(result) => Some(format!(
                    "exit code {}: {}",
                    result.exit_code,
                    result.stderr.trim()
                )),
                Err(e) => Some(e.to_string()),
            };

            match error {
                None => print_success(&action.name),
                Some(ref e) => {
                    print_warning(&format!("{} {}", action.name, e.dimmed()));
                    tracing::warn!(action = %action.name, error = %e, "cleanup action failed");
                }
            }

            results.push(CleanupResult {
                name: action.name.clone(),
                success: error.is_none(),
                error,
            });
        }

        results
    }

    /// Print the execution plan
    fn print_execution_plan(&self, pipeline: &Pipeline, stages: &[&Stage], ctx: &RunContext) {
        println!();
        println!(
            "{}: {} #{}",
            "Pipeline".bold(),
            pipeline.name,
            ctx.build_id
        );
        println!("{}", "═".repeat(50));
        println!(
            "Execution plan ({} stage{}):",
            stages.len(),
            if stages.len() == 1 { "" } else { "s" }
        );
        println!();

        for (i, stage) in stages.iter().enumerate() {
            print!("  {}. {} ({})", i + 1, stage.name.bold(), stage.action_kind());
            if stage.on_failure.stops_run() {
                print!(" {}", "[abort on failure]".dimmed());
            }
            println!();
        }

        println!();
    }

    fn print_summary(&self, report: &RunReport) {
        let line = format!(
            "Pipeline finished {} in {:.2}s ({} of {} stages failed)",
            report.outcome,
            report.duration.as_secs_f64(),
            report.failed_stages().count(),
            report.stages.len()
        );

        println!();
        println!("{}", outcome_style(report.outcome, &line));

        if !report.outcome.is_success() {
            let failed: Vec<&str> = report.failed_stages().map(|s| s.name.as_str()).collect();
            if !failed.is_empty() {
                println!("{}", format!("Failed: {}", failed.join(", ")).dimmed());
            }
        }

        if !report.skipped.is_empty() {
            println!(
                "{}",
                format!("Skipped: {}", report.skipped.join(", ")).dimmed()
            );
        }
    }

    /// Tools referenced by the pipeline that cannot be found
    pub async fn check_tools(&self, pipeline: &Pipeline) -> Vec<String> {
        let mut missing = Vec::new();
        let mut seen = HashSet::new();

        for stage in &pipeline.stages {
            let kind = stage.action_kind();
            let available = match self.executors.get(kind) {
                Some(executor) => executor.check_available(stage).await.unwrap_or(false),
                None => false,
            };

            if !available {
                let label = match &stage.action {
                    Action::Shell { shell, .. } => shell.clone(),
                    _ => kind.to_string(),
                };
                if seen.insert(label.clone()) {
                    missing.push(label);
                }
            }
        }

        for (tool, location) in &pipeline.settings.tools {
            if which::which(location).is_err() && seen.insert(tool.clone()) {
                missing.push(tool.clone());
            }
        }

        missing
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Readable message from a failed stage task
fn panic_message(error: tokio::task::JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "executor panicked".to_string()
    }
}

/// Stages to run, in declaration order
fn select_stages<'a>(
    pipeline: &'a Pipeline,
    only: &[String],
) -> Result<Vec<&'a Stage>, StagehandError> {
    if let Some(unknown) = only.iter().find(|name| pipeline.get_stage(name).is_none()) {
        return Err(StagehandError::StageNotFound {
            stage: unknown.clone(),
        });
    }

    Ok(pipeline
        .stages
        .iter()
        .filter(|s| only.is_empty() || only.contains(&s.name))
        .collect())
}
