//! Tool command configuration.
//!
//! Each tool's command template is resolved independently, first hit wins:
//! 1. `--compiler` / `--learner` / `--refiner` CLI flags
//! 2. the tools config file (`--tools`, `<work-dir>/crefine.json`, or
//!    `<config-dir>/crefine/tools.json`)
//! 3. `CREFINE_COMPILER` / `CREFINE_LEARNER` / `CREFINE_REFINER`
//! 4. built-in defaults
use crate::paths::WorkPaths;
use crate::tools::{Tool, ToolCommand, Toolchain};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const TOOLS_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_COMPILER: &str = "javac";
pub const DEFAULT_LEARNER: &str = "java -ea -cp ralib/target/ralib-0.1-SNAPSHOT-jar-with-dependencies.jar:. de.learnlib.ralib.Main class-analyzer -f";
pub const DEFAULT_REFINER: &str = "python3 CoGent/main.py";

/// On-disk tools config. Omitted commands fall through to the next source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refiner: Option<String>,
}

impl ToolsConfig {
    fn template(&self, tool: Tool) -> Option<&str> {
        match tool {
            Tool::Compiler => self.compiler.as_deref(),
            Tool::Learner => self.learner.as_deref(),
            Tool::Refiner => self.refiner.as_deref(),
        }
    }
}

/// Command templates given directly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ToolOverrides {
    pub compiler: Option<String>,
    pub learner: Option<String>,
    pub refiner: Option<String>,
}

impl ToolOverrides {
    fn template(&self, tool: Tool) -> Option<&str> {
        match tool {
            Tool::Compiler => self.compiler.as_deref(),
            Tool::Learner => self.learner.as_deref(),
            Tool::Refiner => self.refiner.as_deref(),
        }
    }
}

pub fn env_var_name(tool: Tool) -> &'static str {
    match tool {
        Tool::Compiler => "CREFINE_COMPILER",
        Tool::Learner => "CREFINE_LEARNER",
        Tool::Refiner => "CREFINE_REFINER",
    }
}

pub fn default_template(tool: Tool) -> &'static str {
    match tool {
        Tool::Compiler => DEFAULT_COMPILER,
        Tool::Learner => DEFAULT_LEARNER,
        Tool::Refiner => DEFAULT_REFINER,
    }
}

/// Load a tools config from disk and validate it.
pub fn load_tools_config(path: &Path) -> Result<ToolsConfig> {
    let bytes = fs::read(path).with_context(|| format!("read tools config {}", path.display()))?;
    let config: ToolsConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse tools config JSON {}", path.display()))?;
    validate_tools_config(&config)?;
    Ok(config)
}

/// Validate schema version and reject blank templates.
pub fn validate_tools_config(config: &ToolsConfig) -> Result<()> {
    if config.schema_version != TOOLS_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported tools config schema_version {}",
            config.schema_version
        ));
    }
    for tool in Tool::ALL {
        if let Some(template) = config.template(tool) {
            if template.trim().is_empty() {
                return Err(anyhow!("tools config has an empty {tool} command"));
            }
        }
    }
    Ok(())
}

/// Pick the config file to read, if any.
///
/// An explicit path must exist; the implicit locations are optional.
pub fn locate_tools_config(explicit: Option<&Path>, paths: &WorkPaths) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(anyhow!("tools config not found at {}", path.display()));
        }
        return Ok(Some(path.to_path_buf()));
    }
    let local = paths.local_tools_path();
    if local.is_file() {
        return Ok(Some(local));
    }
    let user = dirs::config_dir().map(|dir| dir.join("crefine").join("tools.json"));
    Ok(user.filter(|path| path.is_file()))
}

/// Resolve every tool's template and build the toolchain.
pub fn resolve_toolchain<F>(
    overrides: &ToolOverrides,
    config: Option<&ToolsConfig>,
    env: F,
    work_dir: &Path,
) -> Result<Toolchain>
where
    F: Fn(&str) -> Option<String>,
{
    let resolve = |tool: Tool| -> Result<ToolCommand> {
        let from_env = env(env_var_name(tool)).filter(|value| !value.trim().is_empty());
        let (template, source) = if let Some(template) = overrides.template(tool) {
            (template.to_string(), "command line")
        } else if let Some(template) = config.and_then(|config| config.template(tool)) {
            (template.to_string(), "tools config")
        } else if let Some(template) = from_env {
            (template, env_var_name(tool))
        } else {
            (default_template(tool).to_string(), "default")
        };
        tracing::debug!(tool = %tool, source, template = %template, "resolved tool command");
        ToolCommand::parse(&template).with_context(|| format!("{tool} command from {source}"))
    };

    Ok(Toolchain {
        compiler: resolve(Tool::Compiler)?,
        learner: resolve(Tool::Learner)?,
        refiner: resolve(Tool::Refiner)?,
        work_dir: work_dir.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
