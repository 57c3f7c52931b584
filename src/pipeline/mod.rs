// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Pipeline definitions and execution
//!
//! This module defines the core data structures for stagehand pipelines
//! (stages, cleanup, artifacts, notifications) and the runner that folds
//! stage results into a single build outcome.

mod catalog;
mod context;
mod definition;
mod outcome;
mod report;
mod runner;
mod validation;

pub use catalog::{web_app_pipeline, CatalogConfig};
pub use context::{expand_vars, RunContext};
pub use definition::*;
pub use outcome::{BuildOutcome, FailurePolicy};
pub use report::{truncate_output, CleanupResult, RunReport, StageResult, StageStatus};
pub use runner::{PipelineRunner, RunOptions, REPORT_FILE};
pub use validation::{PipelineValidator, ValidationResult};
