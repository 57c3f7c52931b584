// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Recovery suggestions
//!
//! Concrete next steps printed when a pipeline cannot start or a tool is missing.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest installing a tool a stage shells out to
    pub fn install_tool(tool: &str) -> Self {
        match tool {
            "git" => Self {
                action: "Install Git: https://git-scm.com/downloads".into(),
                steps: vec!["The checkout stage clones the application with git".into()],
                commands: vec![
                    "# Debian/Ubuntu:".into(),
                    "apt-get install git".into(),
                ],
            },
            "npm" | "node" => Self {
                action: "Install Node.js and npm: https://nodejs.org/en/download".into(),
                steps: vec![
                    "Dependency, test, lint, audit and build stages use npm".into(),
                    "Point 'settings.runtime_home' at the Node.js installation".into(),
                ],
                commands: vec![
                    "# Using nvm:".into(),
                    "nvm install --lts".into(),
                ],
            },
            "docker" => Self {
                action: "Install Docker: https://docs.docker.com/engine/install/".into(),
                steps: vec![
                    "Image build, deployment and release tagging stages use docker".into(),
                    "Make sure the current user can reach the Docker daemon".into(),
                ],
                commands: vec!["docker info".into()],
            },
            _ => Self {
                action: format!("Install {} and ensure it's in your PATH", tool),
                steps: vec![format!(
                    "Or set 'settings.tools.{}' to the full executable path",
                    tool
                )],
                commands: vec![],
            },
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_mentions_settings() {
        let suggestion = RecoverySuggestion::install_tool("trivy");
        assert!(suggestion.action.contains("trivy"));
        assert!(suggestion.to_string().contains("settings.tools.trivy"));
    }
}
