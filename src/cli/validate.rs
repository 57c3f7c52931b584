// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Validate command - check pipeline configuration

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::pipeline::{Pipeline, PipelineValidator};
use crate::utils::{print_error, print_section, print_success, print_warning};

/// Run the validate command
pub async fn run(pipeline_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    if !pipeline_path.exists() {
        return super::load_pipeline(&pipeline_path).map(|_| ());
    }

    let pipeline = match Pipeline::from_file(&pipeline_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("  {} Failed to parse pipeline", "✗".red());
            eprintln!();
            return Err(miette::miette!("Parse error: {}", e));
        }
    };

    print_success("Pipeline file parses");

    let validation = PipelineValidator::validate(&pipeline)?;
    let missing = PipelineValidator::validate_environment(&pipeline);

    if !validation.errors.is_empty() {
        print_section("Errors");
        for error in &validation.errors {
            print_error(error);
        }
    }

    if !missing.is_empty() {
        print_section("Environment");
        for problem in &missing {
            print_warning(problem);
        }
    }

    if !validation.warnings.is_empty() {
        print_section("Warnings");
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        print_section("Pipeline summary");
        println!("  Name: {}", pipeline.name);
        println!("  Stages: {}", pipeline.stages.len());
        for stage in &pipeline.stages {
            println!(
                "    - {} ({}, on failure: {})",
                stage.name,
                stage.action_kind(),
                stage.on_failure.to_string().dimmed()
            );
        }
        println!("  Cleanup actions: {}", pipeline.cleanup.len());
        println!("  Artifact patterns: {}", pipeline.artifacts.len());
    }

    println!();

    // Missing tools only degrade a run to UNSTABLE, so they do not fail validation
    if !validation.is_valid() {
        Err(miette::miette!("Pipeline validation failed"))
    } else if validation.has_warnings() || !missing.is_empty() {
        println!("{}", "Pipeline is valid but has warnings.".yellow().bold());
        Ok(())
    } else {
        println!("{}", "Pipeline is valid!".green().bold());
        Ok(())
    }
}
