// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Build outcome and failure policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state build health
///
/// Variants are ordered by severity, so `max` is the downgrade operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildOutcome {
    Success,
    Unstable,
    Failure,
}

impl BuildOutcome {
    /// Fold another outcome in; the result is never better than `self`
    #[must_use]
    pub fn downgrade(self, to: BuildOutcome) -> BuildOutcome {
        self.max(to)
    }

    /// Whether every stage passed
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Process exit code for the CLI
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Unstable => 2,
        }
    }
}

impl Default for BuildOutcome {
    fn default() -> Self {
        Self::Success
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Unstable => write!(f, "UNSTABLE"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

/// What a stage failure does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Mark the build UNSTABLE and keep going
    #[default]
    Unstable,
    /// Mark the build FAILURE and skip the remaining stages
    Abort,
}

impl FailurePolicy {
    /// Outcome a failing stage under this policy contributes
    pub fn outcome(self) -> BuildOutcome {
        match self {
            Self::Unstable => BuildOutcome::Unstable,
            Self::Abort => BuildOutcome::Failure,
        }
    }

    pub fn stops_run(self) -> bool {
        self == Self::Abort
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstable => write!(f, "unstable"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BuildOutcome; 3] = [
        BuildOutcome::Success,
        BuildOutcome::Unstable,
        BuildOutcome::Failure,
    ];

    #[test]
    fn test_downgrade_never_improves() {
        for a in ALL {
            for b in ALL {
                let folded = a.downgrade(b);
                assert!(folded >= a);
                assert!(folded >= b);
            }
        }
    }

    #[test]
    fn test_failure_is_absorbing() {
        let mut outcome = BuildOutcome::Failure;
        for next in ALL {
            outcome = outcome.downgrade(next);
        }
        assert_eq!(outcome, BuildOutcome::Failure);
    }

    #[test]
    fn test_unstable_dominates_success() {
        assert_eq!(
            BuildOutcome::Unstable.downgrade(BuildOutcome::Success),
            BuildOutcome::Unstable
        );
        assert!(!BuildOutcome::Unstable.is_success());
        assert!(BuildOutcome::default().is_success());
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(BuildOutcome::Success.exit_code(), 0);
        assert_ne!(
            BuildOutcome::Unstable.exit_code(),
            BuildOutcome::Failure.exit_code()
        );
    }

    #[test]
    fn test_policy_outcomes() {
        assert_eq!(FailurePolicy::Unstable.outcome(), BuildOutcome::Unstable);
        assert_eq!(FailurePolicy::Abort.outcome(), BuildOutcome::Failure);
        assert!(FailurePolicy::Abort.stops_run());
        assert_eq!(
            serde_json::to_string(&BuildOutcome::Unstable).unwrap(),
            "\"UNSTABLE\""
        );
    }
}
