// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Run context
//!
//! Everything a stage sees besides its own definition: the build id, the run
//! directory and the variables derived from pipeline settings.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::{Pipeline, Stage};

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("variable pattern is valid")
    })
}

/// Expand `${NAME}` references from `vars`, then the process environment.
///
/// Unknown names are left as written.
pub fn expand_vars(text: &str, vars: &HashMap<String, String>) -> String {
    var_pattern()
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            vars.get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Per-run values shared by all stages
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Pipeline name
    pub pipeline_name: String,
    /// Monotonically increasing build number
    pub build_id: u64,
    /// Directory the run is anchored in
    pub run_dir: PathBuf,
    /// Variables injected into every stage
    vars: HashMap<String, String>,
}

impl RunContext {
    /// Build the context for one run of `pipeline`
    pub fn new(pipeline: &Pipeline, run_dir: impl Into<PathBuf>, build_id: u64) -> Self {
        let run_dir = run_dir.into();
        let settings = &pipeline.settings;
        let mut vars = HashMap::new();

        vars.insert("PIPELINE_NAME".to_string(), pipeline.name.clone());
        vars.insert("BUILD_ID".to_string(), build_id.to_string());
        vars.insert("RUN_DIR".to_string(), run_dir.display().to_string());
        vars.insert("WORKSPACE".to_string(), settings.workspace.clone());

        if let Some(ref image) = settings.image {
            vars.insert("IMAGE_NAME".to_string(), image.clone());
        }
        if let Some(ref container) = settings.container {
            vars.insert("CONTAINER_NAME".to_string(), container.clone());
        }

        if let Some(ref home) = settings.runtime_home {
            vars.insert("RUNTIME_HOME".to_string(), home.display().to_string());
            let bin = home.join("bin");
            let path = match std::env::var("PATH") {
                Ok(existing) if !existing.is_empty() => format!("{}:{}", bin.display(), existing),
                _ => bin.display().to_string(),
            };
            vars.insert("PATH".to_string(), path);
        }

        for (tool, location) in &settings.tools {
            vars.insert(tool_var_name(tool), location.clone());
        }

        vars.extend(pipeline.env.clone());

        Self {
            pipeline_name: pipeline.name.clone(),
            build_id,
            run_dir,
            vars,
        }
    }

    /// Run-wide variables
    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// Environment for a stage (stage overrides run-wide values)
    pub fn stage_env(&self, stage: &Stage) -> HashMap<String, String> {
        let mut env = self.vars.clone();
        env.extend(stage.env.clone());
        env
    }

    /// Working directory for a stage
    pub fn working_dir(&self, stage: &Stage) -> PathBuf {
        match stage.working_dir {
            Some(ref dir) => self.resolve(dir),
            None => self.run_dir.clone(),
        }
    }

    /// Resolve a path against the run directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.run_dir.join(path)
        }
    }

    /// Expand `${NAME}` references using the run-wide variables
    pub fn expand(&self, text: &str) -> String {
        expand_vars(text, &self.vars)
    }
}

/// `node-20` -> `NODE_20`
fn tool_var_name(tool: &str) -> String {
    tool.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::from_yaml(
            r#"
name: shop
settings:
  workspace: juice-shop
  image: juice-shop
  runtime_home: /opt/node
  tools:
    git: /usr/bin/git
    node-lts: /opt/node/bin/node
env:
  APP_PORT: "3000"
stages:
  - name: deploy
    working_dir: juice-shop
    env:
      APP_PORT: "8080"
    action:
      type: shell
      command: "true"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_injected_variables() {
        let ctx = RunContext::new(&pipeline(), "/tmp/run", 42);
        let vars = ctx.vars();

        assert_eq!(vars["BUILD_ID"], "42");
        assert_eq!(vars["IMAGE_NAME"], "juice-shop");
        assert_eq!(vars["WORKSPACE"], "juice-shop");
        assert_eq!(vars["GIT"], "/usr/bin/git");
        assert_eq!(vars["NODE_LTS"], "/opt/node/bin/node");
        assert!(vars["PATH"].starts_with("/opt/node/bin"));
        assert!(!vars.contains_key("CONTAINER_NAME"));
    }

    #[test]
    fn test_stage_env_overrides_global() {
        let p = pipeline();
        let ctx = RunContext::new(&p, "/tmp/run", 1);
        let env = ctx.stage_env(&p.stages[0]);

        assert_eq!(env["APP_PORT"], "8080");
        assert_eq!(ctx.vars()["APP_PORT"], "3000");
        assert_eq!(ctx.working_dir(&p.stages[0]), PathBuf::from("/tmp/run/juice-shop"));
    }

    #[test]
    fn test_expand_vars() {
        let mut vars = HashMap::new();
        vars.insert("IMAGE_NAME".to_string(), "shop".to_string());
        vars.insert("BUILD_ID".to_string(), "7".to_string());

        assert_eq!(
            expand_vars("${IMAGE_NAME}:prod-${BUILD_ID}", &vars),
            "shop:prod-7"
        );
        assert_eq!(
            expand_vars("${STAGEHAND_SURELY_UNSET_VAR} $HOME", &vars),
            "${STAGEHAND_SURELY_UNSET_VAR} $HOME"
        );
    }
}
