// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for stagehand.

pub mod init;
pub mod plan;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::errors::StagehandError;
use crate::pipeline::Pipeline;

/// Default pipeline file name
pub const DEFAULT_PIPELINE_FILE: &str = ".stagehand.yaml";

/// Staged CI pipeline runner
///
/// Runs build, test, scan and deploy stages in order and reports
/// SUCCESS, UNSTABLE or FAILURE.
#[derive(Parser, Debug)]
#[clap(
    name = "stagehand",
    version,
    about = "Staged CI pipeline runner with SUCCESS / UNSTABLE / FAILURE outcomes",
    long_about = None,
    after_help = "Examples:\n\
        stagehand init                  Write the built-in web app pipeline\n\
        stagehand validate              Check .stagehand.yaml\n\
        stagehand plan --format json    Show the stages that would run\n\
        stagehand run --build-id 42     Run the pipeline as build 42\n\n\
        Exit codes: 0 = SUCCESS, 2 = UNSTABLE, 1 = FAILURE or error."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the built-in web application pipeline
    Init {
        /// Overwrite an existing pipeline file
        #[clap(short, long)]
        force: bool,

        /// Output file
        #[clap(short, long, default_value = DEFAULT_PIPELINE_FILE)]
        output: PathBuf,
    },

    /// Run the pipeline
    Run {
        /// Pipeline file
        #[clap(short, long, default_value = DEFAULT_PIPELINE_FILE)]
        pipeline: PathBuf,

        /// Build number (defaults to the persisted counter + 1)
        #[clap(long, env = "BUILD_NUMBER")]
        build_id: Option<u64>,

        /// Override settings.image
        #[clap(long, env = "STAGEHAND_IMAGE")]
        image: Option<String>,

        /// Run only specific stages
        #[clap(short, long)]
        stage: Vec<String>,

        /// Dry run (show what would be done)
        #[clap(long)]
        dry_run: bool,

        /// Do not archive artifacts or write the report
        #[clap(long)]
        no_archive: bool,
    },

    /// Validate pipeline configuration
    Validate {
        /// Pipeline file to validate
        #[clap(default_value = DEFAULT_PIPELINE_FILE)]
        pipeline: PathBuf,
    },

    /// Show the execution plan
    Plan {
        /// Pipeline file
        #[clap(default_value = DEFAULT_PIPELINE_FILE)]
        pipeline: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: PlanFormat,
    },
}

/// Output format for the plan command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Text,
    Json,
}

impl std::str::FromStr for PlanFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Load a pipeline file, turning a missing file into a helpful diagnostic
pub(crate) fn load_pipeline(path: &Path) -> miette::Result<Pipeline> {
    if !path.exists() {
        return Err(StagehandError::PipelineNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    Pipeline::from_file(path).map_err(|e| miette::miette!("Failed to load pipeline: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_format_parse() {
        assert_eq!("json".parse::<PlanFormat>().unwrap(), PlanFormat::Json);
        assert_eq!("TEXT".parse::<PlanFormat>().unwrap(), PlanFormat::Text);
        assert!("dot".parse::<PlanFormat>().is_err());
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "stagehand",
            "run",
            "--build-id",
            "7",
            "--stage",
            "test",
            "--stage",
            "lint",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                build_id, stage, ..
            } => {
                assert_eq!(build_id, Some(7));
                assert_eq!(stage, vec!["test", "lint"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_missing_pipeline_is_diagnostic() {
        let err = load_pipeline(Path::new("/nonexistent/.stagehand.yaml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StagehandError>(),
            Some(StagehandError::PipelineNotFound { .. })
        ));
        assert!(err.help().unwrap().to_string().contains("stagehand init"));
    }
}
