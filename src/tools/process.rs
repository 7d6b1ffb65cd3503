//! Real process launcher: inherited stdio, blocking wait, no timeout.
use super::{Launcher, ToolExit, ToolInvocation};
use crate::error::StageError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&mut self, invocation: &ToolInvocation) -> Result<ToolExit, StageError> {
        let program = resolve_program(&invocation.program, &invocation.cwd).map_err(|reason| {
            StageError::Launch {
                tool: invocation.tool,
                program: invocation.program.clone(),
                reason,
            }
        })?;

        let start = Instant::now();
        let status = Command::new(&program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|err| StageError::Launch {
                tool: invocation.tool,
                program: invocation.program.clone(),
                reason: err.to_string(),
            })?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            elapsed_ms,
            tool = %invocation.tool,
            code = ?status.code(),
            "tool invoke complete"
        );

        Ok(match status.code() {
            Some(code) => ToolExit::from_code(code),
            // Killed by a signal.
            None => ToolExit {
                success: false,
                code: None,
                description: status.to_string(),
            },
        })
    }
}

/// Locate the executable before spawning so a missing tool is reported by
/// name. Programs containing a path separator are taken relative to `cwd`.
fn resolve_program(program: &str, cwd: &Path) -> Result<PathBuf, String> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        let candidate = if as_path.is_absolute() {
            as_path.to_path_buf()
        } else {
            cwd.join(as_path)
        };
        if !candidate.is_file() {
            return Err(format!("no such file {}", candidate.display()));
        }
        return Ok(candidate);
    }
    which::which(program).map_err(|err| format!("not found on PATH ({err})"))
}
