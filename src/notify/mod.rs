// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Outcome notifications
//!
//! The final outcome is rendered through one of three templates and handed to
//! each configured channel. Channel failures are logged, never escalated.

use async_trait::async_trait;
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::StagehandError;
use crate::executors::run_shell;
use crate::pipeline::{expand_vars, BuildOutcome, NotificationConfig, RunContext};
use crate::utils::outcome_style;

/// A rendered outcome message
#[derive(Debug, Clone)]
pub struct Notification {
    pub outcome: BuildOutcome,
    pub build_id: u64,
    pub message: String,
}

impl Notification {
    /// Render the template for `outcome` against the run variables
    pub fn render(config: &NotificationConfig, outcome: BuildOutcome, ctx: &RunContext) -> Self {
        let mut vars = ctx.vars().clone();
        vars.insert("OUTCOME".to_string(), outcome.to_string());

        Self {
            outcome,
            build_id: ctx.build_id,
            message: expand_vars(config.template_for(outcome), &vars),
        }
    }
}

/// A notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name, for logs
    fn name(&self) -> &str;

    /// Deliver a notification
    async fn notify(&self, notification: &Notification) -> Result<(), StagehandError>;
}

/// Prints the message to the terminal, coloured by outcome
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), StagehandError> {
        println!(
            "{}",
            outcome_style(notification.outcome, &notification.message).bold()
        );
        Ok(())
    }
}

/// Runs a shell command with `MESSAGE`, `OUTCOME` and `BUILD_ID` set
pub struct CommandNotifier {
    command: String,
    working_dir: PathBuf,
}

impl CommandNotifier {
    pub fn new(command: String, working_dir: PathBuf) -> Self {
        Self { command, working_dir }
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    fn name(&self) -> &str {
        "command"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), StagehandError> {
        let mut env = HashMap::new();
        env.insert("MESSAGE".to_string(), notification.message.clone());
        env.insert("OUTCOME".to_string(), notification.outcome.to_string());
        env.insert("BUILD_ID".to_string(), notification.build_id.to_string());

        let result = run_shell("sh", &self.command, &self.working_dir, &env).await?;
        if result.success {
            Ok(())
        } else {
            Err(StagehandError::NotificationFailed {
                channel: self.name().to_string(),
                message: format!("command exited with {}: {}", result.exit_code, result.stderr.trim()),
            })
        }
    }
}

/// Channels for a pipeline: always the console, plus the command if configured
pub fn notifiers_for(config: &NotificationConfig, ctx: &RunContext) -> Vec<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(ConsoleNotifier)];

    if let Some(ref command) = config.command {
        notifiers.push(Box::new(CommandNotifier::new(
            command.clone(),
            ctx.run_dir.clone(),
        )));
    }

    notifiers
}

/// Send to every channel; returns how many succeeded
pub async fn dispatch(notifiers: &[Box<dyn Notifier>], notification: &Notification) -> usize {
    let mut delivered = 0;

    for notifier in notifiers {
        match notifier.notify(notification).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(channel = notifier.name(), error = %e, "notification failed"),
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use tempfile::TempDir;

    fn context(dir: &std::path::Path) -> RunContext {
        let pipeline = Pipeline::from_yaml("name: shop\nstages: []\n").unwrap();
        RunContext::new(&pipeline, dir, 12)
    }

    #[test]
    fn test_three_distinct_templates() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let config = NotificationConfig::default();

        let messages: Vec<String> = [
            BuildOutcome::Success,
            BuildOutcome::Unstable,
            BuildOutcome::Failure,
        ]
        .into_iter()
        .map(|o| Notification::render(&config, o, &ctx).message)
        .collect();

        assert_eq!(messages[0], "Pipeline shop #12 succeeded");
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
    }

    #[test]
    fn test_custom_template_sees_outcome() {
        let dir = TempDir::new().unwrap();
        let config = NotificationConfig {
            failure: Some("${PIPELINE_NAME}: ${OUTCOME}".into()),
            ..Default::default()
        };

        let n = Notification::render(&config, BuildOutcome::Failure, &context(dir.path()));
        assert_eq!(n.message, "shop: FAILURE");
    }

    #[tokio::test]
    async fn test_command_notifier_receives_message() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let config = NotificationConfig {
            command: Some("printf '%s|%s' \"$OUTCOME\" \"$MESSAGE\" > notified.txt".into()),
            ..Default::default()
        };

        let notifiers = notifiers_for(&config, &ctx);
        let n = Notification::render(&config, BuildOutcome::Unstable, &ctx);
        assert_eq!(dispatch(&notifiers, &n).await, 2);

        let written = std::fs::read_to_string(dir.path().join("notified.txt")).unwrap();
        assert_eq!(written, "UNSTABLE|Pipeline shop #12 is UNSTABLE");
    }

    #[tokio::test]
    async fn test_failing_channel_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path());
        let config = NotificationConfig {
            command: Some("exit 1".into()),
            ..Default::default()
        };

        let notifiers = notifiers_for(&config, &ctx);
        let n = Notification::render(&config, BuildOutcome::Success, &ctx);
        assert_eq!(dispatch(&notifiers, &n).await, 1);
    }
}
