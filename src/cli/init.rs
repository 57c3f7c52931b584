// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Init command - write the built-in pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::pipeline::{web_app_pipeline, CatalogConfig};
use crate::utils::{print_info, print_success};

const HEADER: &str = "\
# stagehand pipeline configuration
#
# Stages run in order. A failing stage marks the build UNSTABLE and the run
# continues; set `on_failure: abort` on a stage to stop with FAILURE instead.
# Cleanup, artifact archiving and notifications always run.

";

/// Run the init command
pub async fn run(output: PathBuf, force: bool, verbose: bool) -> Result<()> {
    println!("{}", "Initializing stagehand pipeline...".bold());
    println!();

    if output.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            output.display()
        ));
    }

    let pipeline = web_app_pipeline(&CatalogConfig::default());
    let content = format!("{}{}", HEADER, pipeline.to_yaml()?);

    std::fs::write(&output, &content)
        .map_err(|e| miette::miette!("Failed to write {}: {}", output.display(), e))?;

    print_success(&format!("Created {}", output.display()));
    print_info(&format!(
        "{} stages, {} cleanup actions",
        pipeline.stages.len(),
        pipeline.cleanup.len()
    ));

    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to point at your tools and application",
        output.display().to_string().cyan()
    );
    println!("  2. Run {} to check it", "stagehand validate".cyan());
    println!("  3. Run {} to execute the pipeline", "stagehand run".cyan());
    println!();

    if verbose {
        println!("{}", "Generated pipeline:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}
