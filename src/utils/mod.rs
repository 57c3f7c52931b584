// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Utility modules
//!
//! Console helpers shared by the runner and the CLI.

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
