// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! # stagehand - Staged CI Pipeline Runner
//!
//! `stagehand` runs a declared sequence of CI stages (checkout, install, test,
//! lint, audit, build, containerise, deploy, probe, tag) and reports a tri-state
//! build outcome.
//!
//! ## Features
//!
//! - **Tri-state outcome** - SUCCESS, UNSTABLE or FAILURE, never upgraded once lowered
//! - **Keep going** - a failing stage marks the build UNSTABLE and the run continues
//! - **Guaranteed cleanup** - cleanup actions run once per run, whatever happened
//! - **Artifacts** - report files are archived with blake3 fingerprints
//! - **Notifications** - one message per run, chosen by outcome
//!
//! ## Quick Start
//!
//! ```bash
//! # Write the built-in web application pipeline
//! stagehand init
//!
//! # Check it
//! stagehand validate
//!
//! # Run it as build 42
//! stagehand run --build-id 42
//! ```

pub mod artifacts;
pub mod build_id;
pub mod cli;
pub mod errors;
pub mod executors;
pub mod notify;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use errors::{StagehandError, StagehandResult};
pub use pipeline::{BuildOutcome, Pipeline, PipelineRunner, RunContext, Stage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
