// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Built-in stage catalog
//!
//! The standard web application pipeline: reset, checkout, install, test, lint,
//! audit, build, containerise, deploy, probe, tag, then two informational
//! stages. Every stage continues as UNSTABLE on failure so a single run shows
//! every problem at once.

use std::collections::{BTreeMap, HashMap};

use super::{
    Action, ArtifactSpec, CleanupAction, FailurePolicy, NotificationConfig, Pipeline, Settings,
    Stage,
};
use crate::pipeline::definition::default_shell;

/// Parameters of the built-in pipeline
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub name: String,
    pub repo_url: String,
    pub workspace: String,
    pub image: String,
    pub container: String,
    pub app_port: u16,
    /// Text the deployed home page must contain
    pub marker: String,
    /// Seconds to let the container start before probing
    pub readiness_wait_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            name: "juice-shop-ci".into(),
            repo_url: "https://github.com/juice-shop/juice-shop.git".into(),
            workspace: "juice-shop".into(),
            image: "juice-shop".into(),
            container: "juice-shop-test".into(),
            app_port: 3000,
            marker: "OWASP Juice Shop".into(),
            readiness_wait_secs: 10,
        }
    }
}

fn stage(name: &str, description: &str, action: Action) -> Stage {
    Stage {
        name: name.into(),
        description: Some(description.into()),
        action,
        on_failure: FailurePolicy::Unstable,
        working_dir: None,
        env: HashMap::new(),
        delay_secs: 0,
        timeout_secs: None,
    }
}

fn shell(command: &str) -> Action {
    Action::Shell {
        command: command.into(),
        shell: default_shell(),
    }
}

fn in_workspace(mut stage: Stage, workspace: &str) -> Stage {
    stage.working_dir = Some(workspace.into());
    stage
}

/// The built-in 13-stage web application pipeline
pub fn web_app_pipeline(config: &CatalogConfig) -> Pipeline {
    let ws = config.workspace.as_str();

    let mut tools = BTreeMap::new();
    tools.insert("git".to_string(), "git".to_string());
    tools.insert("npm".to_string(), "npm".to_string());
    tools.insert("docker".to_string(), "docker".to_string());

    let mut env = HashMap::new();
    env.insert("REPO_URL".to_string(), config.repo_url.clone());
    env.insert("APP_PORT".to_string(), config.app_port.to_string());

    let mut test = in_workspace(
        stage(
            "test",
            "Run the test suite with a JUnit report",
            shell(r#""$NPM" test -- --ci --reporters=default --reporters=jest-junit"#),
        ),
        ws,
    );
    test.env
        .insert("JEST_JUNIT_OUTPUT_FILE".into(), "test-results.xml".into());

    let mut health = stage(
        "health-check",
        "Probe the deployed container",
        Action::Probe {
            url: "http://localhost:${APP_PORT}".into(),
            expect: config.marker.clone(),
            timeout_secs: 10,
        },
    );
    health.delay_secs = config.readiness_wait_secs;

    let stages = vec![
        stage(
            "workspace-reset",
            "Remove the previous checkout",
            shell(r#"rm -rf "$WORKSPACE""#),
        ),
        stage(
            "checkout",
            "Clone the application",
            shell(r#""$GIT" clone --depth 1 "$REPO_URL" "$WORKSPACE""#),
        ),
        in_workspace(
            stage("install", "Install dependencies", shell(r#""$NPM" install"#)),
            ws,
        ),
        test,
        in_workspace(
            stage("lint", "Static analysis", shell(r#""$NPM" run lint"#)),
            ws,
        ),
        in_workspace(
            stage(
                "dependency-audit",
                "Vulnerability audit: all findings, then moderate and above",
                shell(r#""$NPM" audit || true; "$NPM" audit --audit-level=moderate"#),
            ),
            ws,
        ),
        in_workspace(
            stage(
                "build",
                "Build the application",
                shell(r#""$NPM" run build --if-present"#),
            ),
            ws,
        ),
        in_workspace(
            stage(
                "image-build",
                "Build the container image",
                shell(r#""$DOCKER" build -t "$IMAGE_NAME:latest" ."#),
            ),
            ws,
        ),
        stage(
            "deploy",
            "Run the image locally",
            shell(
                r#""$DOCKER" run -d --name "$CONTAINER_NAME" -p "$APP_PORT:3000" "$IMAGE_NAME:latest""#,
            ),
        ),
        health,
        stage(
            "release-tag",
            "Tag the image for production",
            shell(r#""$DOCKER" tag "$IMAGE_NAME:latest" "$IMAGE_NAME:prod-$BUILD_ID""#),
        ),
        stage(
            "deployment-simulation",
            "Simulated production rollout and monitoring",
            Action::Notice {
                lines: vec![
                    "Deploying ${IMAGE_NAME}:prod-${BUILD_ID} to production (simulated)".into(),
                    "Rolling update: 3/3 replicas healthy (simulated)".into(),
                    "Monitoring: error rate 0.0%, p95 latency nominal (simulated)".into(),
                ],
            },
        ),
        stage(
            "vulnerability-summary",
            "Known vulnerability classes in the application under test",
            Action::Notice {
                lines: vec![
                    "${PIPELINE_NAME} #${BUILD_ID} deploys an intentionally vulnerable application".into(),
                    "Expected findings: injection, broken authentication, XSS, insecure dependencies".into(),
                    "See the dependency-audit stage output for concrete advisories".into(),
                ],
            },
        ),
    ];

    Pipeline {
        version: "1".into(),
        name: config.name.clone(),
        description: Some(format!(
            "Build, scan, containerise and smoke-test {}",
            config.repo_url
        )),
        settings: Settings {
            workspace: config.workspace.clone(),
            image: Some(config.image.clone()),
            container: Some(config.container.clone()),
            tools,
            ..Settings::default()
        },
        env,
        stages,
        cleanup: vec![
            CleanupAction {
                name: "stop-container".into(),
                command: r#""${DOCKER:-docker}" stop "$CONTAINER_NAME""#.into(),
                shell: default_shell(),
            },
            CleanupAction {
                name: "remove-container".into(),
                command: r#""${DOCKER:-docker}" rm "$CONTAINER_NAME""#.into(),
                shell: default_shell(),
            },
        ],
        artifacts: vec![
            ArtifactSpec {
                pattern: format!("{}/test-results.xml", ws),
                description: Some("JUnit test report".into()),
            },
            ArtifactSpec {
                pattern: format!("{}/coverage/lcov.info", ws),
                description: Some("Coverage data".into()),
            },
        ],
        notifications: NotificationConfig {
            success: Some("${PIPELINE_NAME} #${BUILD_ID}: all stages passed, ${IMAGE_NAME}:prod-${BUILD_ID} is tagged".into()),
            unstable: Some("${PIPELINE_NAME} #${BUILD_ID}: finished UNSTABLE, check the failed stages in the report".into()),
            failure: Some("${PIPELINE_NAME} #${BUILD_ID}: FAILED".into()),
            command: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineValidator;

    #[test]
    fn test_catalog_has_thirteen_unique_stages() {
        let pipeline = web_app_pipeline(&CatalogConfig::default());
        assert_eq!(pipeline.stages.len(), 13);

        let mut names = pipeline.stage_names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 13);
        assert_eq!(pipeline.stages[3].name, "test");
    }

    #[test]
    fn test_catalog_never_aborts() {
        let pipeline = web_app_pipeline(&CatalogConfig::default());
        assert!(pipeline
            .stages
            .iter()
            .all(|s| s.on_failure == FailurePolicy::Unstable));
    }

    #[test]
    fn test_catalog_is_valid_and_reloads() {
        let pipeline = web_app_pipeline(&CatalogConfig::default());
        let validation = PipelineValidator::validate(&pipeline).unwrap();
        assert!(validation.is_valid(), "{:?}", validation.errors);

        let reloaded = Pipeline::from_yaml(&pipeline.to_yaml().unwrap()).unwrap();
        assert_eq!(reloaded.stage_names(), pipeline.stage_names());
        assert_eq!(reloaded.get_stage("health-check").unwrap().delay_secs, 10);
    }

    #[test]
    fn test_probe_uses_marker() {
        let config = CatalogConfig {
            marker: "My Shop".into(),
            ..Default::default()
        };
        let pipeline = web_app_pipeline(&config);

        match &pipeline.get_stage("health-check").unwrap().action {
            Action::Probe { expect, .. } => assert_eq!(expect, "My Shop"),
            _ => panic!("Expected Probe action"),
        }
    }
}
