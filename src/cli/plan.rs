// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Plan command - show what a run would do

use colored::Colorize;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::PlanFormat;
use crate::pipeline::{FailurePolicy, Pipeline};

/// One stage of the execution plan
#[derive(Debug, Serialize)]
pub struct PlannedStage {
    pub index: usize,
    pub name: String,
    pub action: String,
    pub on_failure: FailurePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    pub delay_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Full execution plan
#[derive(Debug, Serialize)]
pub struct Plan {
    pub pipeline: String,
    pub stages: Vec<PlannedStage>,
    pub cleanup: Vec<String>,
    pub artifacts: Vec<String>,
}

impl Plan {
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self {
            pipeline: pipeline.name.clone(),
            stages: pipeline
                .stages
                .iter()
                .enumerate()
                .map(|(i, stage)| PlannedStage {
                    index: i + 1,
                    name: stage.name.clone(),
                    action: stage.action_kind().to_string(),
                    on_failure: stage.on_failure,
                    description: stage.description.clone(),
                    working_dir: stage.working_dir.clone(),
                    delay_secs: stage.delay_secs,
                    timeout_secs: stage.timeout_secs,
                })
                .collect(),
            cleanup: pipeline.cleanup.iter().map(|c| c.name.clone()).collect(),
            artifacts: pipeline.artifacts.iter().map(|a| a.pattern.clone()).collect(),
        }
    }
}

/// Run the plan command
pub async fn run(pipeline_path: PathBuf, format: PlanFormat, verbose: bool) -> Result<()> {
    let pipeline = super::load_pipeline(&pipeline_path)?;
    let plan = Plan::from_pipeline(&pipeline);

    match format {
        PlanFormat::Json => {
            let json = serde_json::to_string_pretty(&plan)
                .map_err(|e| miette::miette!("Failed to serialize plan: {}", e))?;
            println!("{}", json);
        }
        PlanFormat::Text => print_text(&plan, verbose),
    }

    Ok(())
}

fn print_text(plan: &Plan, verbose: bool) {
    println!("{}", format!("Pipeline: {}", plan.pipeline).bold());
    println!("{}", "═".repeat(50));

    for stage in &plan.stages {
        let mut notes = Vec::new();
        if stage.delay_secs > 0 {
            notes.push(format!("wait {}s", stage.delay_secs));
        }
        if let Some(timeout) = stage.timeout_secs {
            notes.push(format!("timeout {}s", timeout));
        }
        if stage.on_failure == FailurePolicy::Abort {
            notes.push("aborts on failure".to_string());
        }

        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", notes.join(", "))
        };

        println!(
            "  {:>2}. {} ({}){}",
            stage.index,
            stage.name.cyan(),
            stage.action,
            notes.dimmed()
        );

        if verbose {
            if let Some(ref description) = stage.description {
                println!("      {}", description.dimmed());
            }
        }
    }

    if !plan.cleanup.is_empty() {
        println!();
        println!("{}:", "Cleanup".bold());
        for name in &plan.cleanup {
            println!("  • {}", name);
        }
    }

    if !plan.artifacts.is_empty() {
        println!();
        println!("{}:", "Artifacts".bold());
        for pattern in &plan.artifacts {
            println!("  • {}", pattern);
        }
    }
}
