// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Pipeline definition structures
//!
//! Defines the schema for .stagehand.yaml (or .stagehand.toml) files.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::outcome::{BuildOutcome, FailurePolicy};

/// Pipeline definition from .stagehand.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    /// Pipeline version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Pipeline name
    pub name: String,

    /// Pipeline description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Run-wide settings exported to every stage
    #[serde(default)]
    pub settings: Settings,

    /// Global environment variables
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Stages in execution order
    pub stages: Vec<Stage>,

    /// Teardown commands run after the stages, whatever the outcome
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleanup: Vec<CleanupAction>,

    /// Files to archive after the run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactSpec>,

    /// Outcome notification templates and channel
    #[serde(default)]
    pub notifications: NotificationConfig,
}

fn default_version() -> String {
    "1".to_string()
}

impl Pipeline {
    /// Load pipeline from a file; `.toml` files are parsed as TOML, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self, crate::StagehandError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::StagehandError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Parse pipeline from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, crate::StagehandError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Parse pipeline from TOML string
    pub fn from_toml(source: &str) -> Result<Self, crate::StagehandError> {
        toml::from_str(source).map_err(Into::into)
    }

    /// Serialize pipeline to YAML
    pub fn to_yaml(&self) -> Result<String, crate::StagehandError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Get a stage by name
    pub fn get_stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Get all stage names
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Environment inputs shared by every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Workspace directory name, relative to the run directory
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// Container image name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Name of the transient container created by deployment stages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Installation path of the language runtime; `<runtime_home>/bin` is put on PATH
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_home: Option<PathBuf>,

    /// Executable locations, exported upper-cased (`git` -> `GIT`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, String>,

    /// Where archived artifacts and run reports go
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Characters of captured output kept per stage
    #[serde(default = "default_output_limit")]
    pub output_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            image: None,
            container: None,
            runtime_home: None,
            tools: BTreeMap::new(),
            archive_dir: default_archive_dir(),
            output_limit: default_output_limit(),
        }
    }
}

fn default_workspace() -> String {
    "workspace".to_string()
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(".stagehand/archive")
}

fn default_output_limit() -> usize {
    2000
}

/// A single pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name (must be unique within pipeline)
    pub name: String,

    /// Stage description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// What the stage runs
    pub action: Action,

    /// What a failure of this stage does to the run
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Working directory, relative to the run directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Environment variables for this stage
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// Seconds to wait before the action starts
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delay_secs: u64,

    /// Abort the action after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Stage {
    /// Create a shell stage with default policy
    pub fn shell(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            action: Action::Shell {
                command: command.into(),
                shell: default_shell(),
            },
            on_failure: FailurePolicy::default(),
            working_dir: None,
            env: HashMap::new(),
            delay_secs: 0,
            timeout_secs: None,
        }
    }

    /// Get the action kind, used to look up the executor
    pub fn action_kind(&self) -> &str {
        self.action.kind()
    }
}

/// Stage action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Shell command
    Shell {
        /// Shell command to run
        command: String,

        /// Shell to use (bash, sh, etc.)
        #[serde(default = "default_shell")]
        shell: String,
    },

    /// HTTP health probe
    Probe {
        /// URL to GET; `${VAR}` references are expanded
        url: String,

        /// Marker the response body must contain
        expect: String,

        /// Request timeout
        #[serde(default = "default_probe_timeout")]
        timeout_secs: u64,
    },

    /// Informational output only
    Notice {
        /// Lines to print; `${VAR}` references are expanded
        lines: Vec<String>,
    },
}

impl Action {
    /// Executor name for this action
    pub fn kind(&self) -> &str {
        match self {
            Self::Shell { .. } => "shell",
            Self::Probe { .. } => "probe",
            Self::Notice { .. } => "notice",
        }
    }
}

pub(crate) fn default_shell() -> String {
    "bash".to_string()
}

fn default_probe_timeout() -> u64 {
    10
}

/// Best-effort teardown command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupAction {
    /// Action name, for reporting
    pub name: String,

    /// Shell command to run
    pub command: String,

    /// Shell to use
    #[serde(default = "default_shell")]
    pub shell: String,
}

/// Artifact to archive after the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Glob pattern, relative to the run directory
    pub pattern: String,

    /// What the artifact is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outcome notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Message template for SUCCESS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,

    /// Message template for UNSTABLE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unstable: Option<String>,

    /// Message template for FAILURE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    /// Shell command that receives the rendered message in `MESSAGE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl NotificationConfig {
    /// Template for an outcome, falling back to the built-in wording
    pub fn template_for(&self, outcome: BuildOutcome) -> &str {
        let configured = match outcome {
            BuildOutcome::Success => self.success.as_deref(),
            BuildOutcome::Unstable => self.unstable.as_deref(),
            BuildOutcome::Failure => self.failure.as_deref(),
        };

        configured.unwrap_or(match outcome {
            BuildOutcome::Success => "Pipeline ${PIPELINE_NAME} #${BUILD_ID} succeeded",
            BuildOutcome::Unstable => "Pipeline ${PIPELINE_NAME} #${BUILD_ID} is UNSTABLE",
            BuildOutcome::Failure => "Pipeline ${PIPELINE_NAME} #${BUILD_ID} FAILED",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pipeline() {
        let yaml = r#"
version: "1"
name: "test-pipeline"
stages:
  - name: "install"
    action:
      type: shell
      command: npm install
"#;

        let pipeline = Pipeline::from_yaml(yaml).unwrap();
        assert_eq!(pipeline.name, "test-pipeline");
        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(pipeline.stages[0].on_failure, FailurePolicy::Unstable);
        assert_eq!(pipeline.settings.output_limit, 2000);
        match &pipeline.stages[0].action {
            Action::Shell { shell, .. } => assert_eq!(shell, "bash"),
            _ => panic!("Expected Shell action"),
        }
    }

    #[test]
    fn test_parse_probe_and_notice() {
        let yaml = r#"
name: "deploy"
settings:
  image: juice-shop
  tools:
    git: /usr/bin/git
stages:
  - name: "health"
    delay_secs: 10
    on_failure: abort
    action:
      type: probe
      url: "http://localhost:3000"
      expect: "OWASP Juice Shop"
  - name: "summary"
    action:
      type: notice
      lines:
        - "Image ${IMAGE_NAME} ready"
"#;

        let pipeline = Pipeline::from_yaml(yaml).unwrap();
        let health = pipeline.get_stage("health").unwrap();
        assert_eq!(health.delay_secs, 10);
        assert_eq!(health.on_failure, FailurePolicy::Abort);
        match &health.action {
            Action::Probe {
                expect,
                timeout_secs,
                ..
            } => {
                assert_eq!(expect, "OWASP Juice Shop");
                assert_eq!(*timeout_secs, 10);
            }
            _ => panic!("Expected Probe action"),
        }
        assert_eq!(pipeline.get_stage("summary").unwrap().action_kind(), "notice");
        assert_eq!(pipeline.settings.tools["git"], "/usr/bin/git");
    }

    #[test]
    fn test_parse_toml_pipeline() {
        let source = r#"
name = "toml-pipeline"

[[stages]]
name = "lint"
action = { type = "shell", command = "npm run lint", shell = "sh" }

[[cleanup]]
name = "stop"
command = "docker stop app"

[[artifacts]]
pattern = "reports/*.xml"
"#;

        let pipeline = Pipeline::from_toml(source).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["lint"]);
        assert_eq!(pipeline.cleanup.len(), 1);
        assert_eq!(pipeline.artifacts[0].pattern, "reports/*.xml");
    }

    #[test]
    fn test_notification_template_fallback() {
        let config = NotificationConfig {
            unstable: Some("careful: ${BUILD_ID}".into()),
            ..Default::default()
        };

        assert_eq!(config.template_for(BuildOutcome::Unstable), "careful: ${BUILD_ID}");
        assert!(config.template_for(BuildOutcome::Failure).contains("FAILED"));
    }

    #[test]
    fn test_yaml_output_reloads() {
        let mut pipeline = Pipeline::from_yaml("name: p\nstages: []\n").unwrap();
        pipeline.stages.push(Stage::shell("build", "npm run build"));

        let parsed = Pipeline::from_yaml(&pipeline.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed.stage_names(), vec!["build"]);
        assert!(!parsed.to_yaml().unwrap().contains("delay_secs"));
    }
}
