// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Terminal color utilities
//!
//! Provides consistent color schemes across the CLI.

use colored::{ColoredString, Colorize};

use crate::pipeline::BuildOutcome;

/// Color text by build outcome: green, yellow or red
pub fn outcome_style(outcome: BuildOutcome, text: &str) -> ColoredString {
    match outcome {
        BuildOutcome::Success => text.green(),
        BuildOutcome::Unstable => text.yellow(),
        BuildOutcome::Failure => text.red(),
    }
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_style_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(
            outcome_style(BuildOutcome::Unstable, "UNSTABLE").to_string(),
            "UNSTABLE"
        );
        colored::control::unset_override();
    }
}
