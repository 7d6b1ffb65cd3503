//! Adapters for the three external tools the pipeline drives.
//!
//! Each adapter appends its stage arguments to a configured command template
//! and hands the invocation to a [`Launcher`]. Launch failures and non-zero
//! exits surface as different [`StageError`] variants.
mod process;

pub use process::ProcessLauncher;

use crate::error::StageError;
use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Compiler,
    Learner,
    Refiner,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Compiler, Tool::Learner, Tool::Refiner];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Compiler => "compiler",
            Tool::Learner => "learner",
            Tool::Refiner => "refiner",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command template: program plus fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// Split a shell-style template such as `python3 CoGent/main.py`.
    pub fn parse(template: &str) -> Result<Self> {
        let mut parts = shell_words::split(template)
            .with_context(|| format!("parse tool command: {template}"))?;
        if parts.is_empty() {
            return Err(anyhow!("tool command is empty"));
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// One fully resolved external process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: Tool,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ToolInvocation {
    pub fn command_line(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

/// How a launched tool exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExit {
    pub success: bool,
    pub code: Option<i32>,
    pub description: String,
}

impl ToolExit {
    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
            description: format!("exit status: {code}"),
        }
    }
}

/// Starts an external process and blocks until it exits.
///
/// `Err` is reserved for processes that never started.
pub trait Launcher {
    fn launch(&mut self, invocation: &ToolInvocation) -> Result<ToolExit, StageError>;
}

/// Command templates for all three tools plus the directory they run in.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub compiler: ToolCommand,
    pub learner: ToolCommand,
    pub refiner: ToolCommand,
    pub work_dir: PathBuf,
}

impl Toolchain {
    pub fn command(&self, tool: Tool) -> &ToolCommand {
        match tool {
            Tool::Compiler => &self.compiler,
            Tool::Learner => &self.learner,
            Tool::Refiner => &self.refiner,
        }
    }

    pub fn invocation(&self, tool: Tool, stage_args: Vec<String>) -> ToolInvocation {
        let command = self.command(tool);
        let mut args = command.args().to_vec();
        args.extend(stage_args);
        ToolInvocation {
            tool,
            program: command.program().to_string(),
            args,
            cwd: self.work_dir.clone(),
        }
    }

    /// Compile a source subject. Arguments: `<subject>`.
    pub fn compile(&self, launcher: &mut dyn Launcher, subject: &Path) -> Result<(), StageError> {
        let invocation = self.invocation(Tool::Compiler, vec![path_arg(subject)]);
        run_checked(launcher, &invocation)
    }

    /// Learn a model from the learner config. Arguments: `<config>`.
    pub fn learn(&self, launcher: &mut dyn Launcher, config: &Path) -> Result<(), StageError> {
        let invocation = self.invocation(Tool::Learner, vec![path_arg(config)]);
        run_checked(launcher, &invocation)
    }

    /// Refine the model toward `target`. Arguments: `-i <model> -t <target>`.
    pub fn refine(
        &self,
        launcher: &mut dyn Launcher,
        model: &Path,
        target: &str,
    ) -> Result<(), StageError> {
        let invocation = self.invocation(
            Tool::Refiner,
            vec![
                "-i".to_string(),
                path_arg(model),
                "-t".to_string(),
                target.to_string(),
            ],
        );
        run_checked(launcher, &invocation)
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn run_checked(launcher: &mut dyn Launcher, invocation: &ToolInvocation) -> Result<(), StageError> {
    tracing::debug!(
        tool = %invocation.tool,
        command = %invocation.command_line(),
        "launching tool"
    );
    let exit = launcher.launch(invocation)?;
    tracing::debug!(tool = %invocation.tool, code = ?exit.code, "tool exited");
    if !exit.success {
        return Err(StageError::ToolFailed {
            tool: invocation.tool,
            status: exit.description,
        });
    }
    Ok(())
}
