//! Console rendering of pipeline progress.
//!
//! The coordinator never prints; this observer turns each [`StageResult`]
//! into operator-facing lines on stdout.
use crate::pipeline::{RunObserver, RunReport, Stage, StageResult, StageStatus};
use crate::request::Mode;
use std::fmt::Write as _;

const CATALOGUE_HINT: &str = "use exactly one of the above as the target";

/// Prints one block per finished stage to stdout.
#[derive(Debug)]
pub struct ConsoleObserver {
    verbose: bool,
    total: usize,
    started: usize,
}

impl ConsoleObserver {
    /// `mode` sizes the `[k/n]` progress counter shown with `--verbose`.
    pub fn new(verbose: bool, mode: Mode) -> Self {
        Self {
            verbose,
            total: Stage::sequence(mode).len(),
            started: 0,
        }
    }
}

impl RunObserver for ConsoleObserver {
    fn stage_started(&mut self, stage: Stage) {
        self.started += 1;
        if self.verbose {
            println!("[{}/{}] {}", self.started, self.total, stage.label());
        }
    }

    fn stage_finished(&mut self, result: &StageResult) {
        print!("{}", render_stage(result));
        if self.verbose {
            println!("    ({} ms)", result.elapsed_ms);
        }
    }
}

fn marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Passed => "[+]",
        StageStatus::Skipped => "[-]",
        StageStatus::Warned => "[!]",
        StageStatus::Failed => "[x]",
    }
}

/// Render a finished stage, including its catalogue when it carries one.
pub fn render_stage(result: &StageResult) -> String {
    let mut out = String::new();
    let line = result
        .diagnostic()
        .unwrap_or_else(|| result.stage.label().to_string());
    let _ = writeln!(out, "{} {line}", marker(result.status));
    if !result.catalogue.is_empty() {
        for name in &result.catalogue {
            let _ = writeln!(out, "    - {name}");
        }
        let _ = writeln!(out, "    {CATALOGUE_HINT}");
    }
    out
}

/// Final line for a run.
pub fn render_summary(report: &RunReport, target: &str) -> String {
    if let Some(failed) = report.failed_stage() {
        return format!("[x] run failed at {}", failed.stage.label());
    }
    let tools = match report.mode {
        Mode::Generate => "learner and refiner",
        Mode::Reuse => "refiner",
    };
    let mut line = format!("[+] {tools} finished; contract refined for {target}");
    if report.mode == Mode::Reuse {
        line.push_str(" using the existing model");
    }
    let warnings = report.warnings().count();
    if warnings > 0 {
        let _ = write!(line, " ({warnings} warning(s))");
    }
    line
}
