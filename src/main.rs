mod cli;
mod config;
mod error;
mod model;
mod paths;
mod pipeline;
mod report;
mod request;
mod subject;
#[cfg(test)]
mod test_support;
mod tools;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use cli::{Cli, USAGE};
use paths::WorkPaths;
use pipeline::Coordinator;
use report::{render_summary, ConsoleObserver};
use std::fs;
use std::process::ExitCode;
use tools::{ProcessLauncher, Toolchain};
use tracing_subscriber::EnvFilter;

const EXIT_PIPELINE_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "CREFINE_LOG";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                eprint!("{}", err.render());
                return usage_error();
            }
        },
    };
    init_tracing(cli.verbose);

    let request = match cli.request() {
        Ok(request) => request,
        Err(err) => {
            eprintln!("error: {err}");
            return usage_error();
        }
    };

    let (paths, toolchain) = match prepare(&cli) {
        Ok(setup) => setup,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let mut launcher = ProcessLauncher::new();
    let mut observer = ConsoleObserver::new(cli.verbose, request.mode());
    let report = Coordinator::new(&toolchain, &paths, &mut launcher, &mut observer).run(&request);
    tracing::debug!(
        diagnostics = ?report.diagnostics(),
        symbols = report.symbols.as_ref().map_or(0, |symbols| symbols.len()),
        "run finished"
    );
    println!("{}", render_summary(&report, request.target_symbol()));

    if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PIPELINE_FAILURE)
    }
}

fn usage_error() -> ExitCode {
    println!("{USAGE}");
    ExitCode::from(EXIT_USAGE)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Resolve the work dir and the toolchain before any stage runs.
fn prepare(cli: &Cli) -> Result<(WorkPaths, Toolchain)> {
    let work_dir = match &cli.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolve current directory")?,
    };
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("create work dir {}", work_dir.display()))?;
    let work_dir = work_dir
        .canonicalize()
        .with_context(|| format!("resolve work dir {}", work_dir.display()))?;
    let paths = WorkPaths::new(work_dir);

    let config = match config::locate_tools_config(cli.tools.as_deref(), &paths)? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading tools config");
            Some(config::load_tools_config(&path)?)
        }
        None => None,
    };
    let toolchain = config::resolve_toolchain(
        &cli.overrides(),
        config.as_ref(),
        |key| std::env::var(key).ok(),
        paths.root(),
    )?;
    Ok((paths, toolchain))
}
