//! Shared test infrastructure for integration tests.
//!
//! Each [`Workspace`] is a temp dir with a work dir and shell-script stand-ins
//! for the compiler, learner, and refiner. Every fake appends one line to
//! `calls.log` so tests can assert on launch order and arguments.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::class_bytes;

/// Model text the fake learner writes, quoted identifiers included.
pub const LEARNED_MODEL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<register-automaton>
  <alphabet>
    <inputs>
      <symbol name=\"IPush\"><param type=\"int\" name=\"p1\"/></symbol>
      <symbol name=\"IPop\"/>
    </inputs>
  </alphabet>
  <transition from=\"l0\" to=\"l1\" symbol=\"IPush\" params=\"p1\">
    <assignments><assign to='r1'>'p1'</assign></assignments>
  </transition>
</register-automaton>
";

pub struct Workspace {
    pub temp: TempDir,
    pub work_dir: PathBuf,
}

/// Result of one `crefine` invocation.
pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for Run {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let work_dir = temp.path().join("work");
        fs::create_dir_all(&work_dir).expect("create work dir");
        let work_dir = work_dir.canonicalize().expect("canonical work dir");
        Self { temp, work_dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn model_path(&self) -> PathBuf {
        self.work_dir.join("model.xml")
    }

    fn calls_log(&self) -> PathBuf {
        self.path("calls.log")
    }

    /// Write an executable script that logs its name and arguments, runs
    /// `body`, and exits with `code`.
    pub fn fake_tool(&self, name: &str, body: &str, code: i32) -> PathBuf {
        let script = format!(
            "#!/bin/sh\necho \"{name} $*\" >> '{log}'\n{body}\nexit {code}\n",
            log = self.calls_log().display()
        );
        let path = self.write(name, script);
        let mut permissions = fs::metadata(&path).expect("script metadata").permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).expect("chmod script");
        path
    }

    /// Compiler that copies a prebuilt class declaring `methods` next to
    /// the `.java` argument.
    pub fn fake_compiler(&self, class_name: &str, methods: &[&str]) -> String {
        let prebuilt = self.write("prebuilt.class", class_bytes(class_name, methods));
        let script = self.fake_tool("compile.sh", "cp \"$1\" \"${2%.java}.class\"", 0);
        format!("{} {}", script.display(), prebuilt.display())
    }

    /// Learner that writes [`LEARNED_MODEL`] into its working directory.
    pub fn fake_learner(&self, code: i32) -> String {
        let body = format!("cat > model.xml <<'MODEL'\n{LEARNED_MODEL}MODEL");
        self.fake_tool("learn.sh", &body, code).display().to_string()
    }

    pub fn fake_refiner(&self, code: i32) -> String {
        self.fake_tool("refine.sh", ":", code).display().to_string()
    }

    /// Lines written by the fake tools, in launch order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.calls_log())
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn crefine(&self, args: &[&str]) -> Run {
        Command::new(env!("CARGO_BIN_EXE_crefine"))
            .arg("--work-dir")
            .arg(&self.work_dir)
            .args(args)
            .current_dir(self.temp.path())
            .env_remove("CREFINE_COMPILER")
            .env_remove("CREFINE_LEARNER")
            .env_remove("CREFINE_REFINER")
            .env_remove("CREFINE_LOG")
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .output()
            .expect("run crefine")
            .into()
    }
}

/// Tool names recorded in `calls`, dropping their arguments.
pub fn tool_names(calls: &[String]) -> Vec<&str> {
    calls
        .iter()
        .filter_map(|line| line.split_whitespace().next())
        .collect()
}

pub fn display(path: &Path) -> String {
    path.display().to_string()
}
