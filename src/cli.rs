//! CLI argument parsing for the learn-then-refine pipeline.
//!
//! Positionals are collected raw; whether they form a generate or a reuse
//! request is decided by [`PipelineRequest::from_args`], so arity problems
//! surface as usage errors before any stage runs.
use crate::config::ToolOverrides;
use crate::error::RequestError;
use crate::request::PipelineRequest;
use clap::Parser;
use std::path::PathBuf;

/// Usage text printed on stdout for malformed invocations.
pub const USAGE: &str = "\
usage:
  crefine [OPTIONS] <SUBJECT> <CONFIG> <TARGET>
  crefine [OPTIONS] --existing-model <MODEL> <TARGET> [EXTRA...]

Generate mode compiles SUBJECT when it is a .java source, learns a model
from CONFIG, and refines it toward TARGET. Reuse mode validates MODEL, copies
it to <work-dir>/model.xml, and refines it toward TARGET.

Run `crefine --help` for every option.";

#[derive(Parser, Debug)]
#[command(
    name = "crefine",
    version,
    about = "Learn a register-automaton model and refine it into a contract",
    override_usage = "crefine [OPTIONS] <SUBJECT> <CONFIG> <TARGET>\n       crefine [OPTIONS] --existing-model <MODEL> <TARGET> [EXTRA...]",
    after_help = "Examples:\n  crefine BoundedList.java list.properties push\n  crefine --existing-model runs/model.xml push\n  crefine --work-dir /tmp/run --refiner 'python3 tools/refine.py' List.class list.properties pop"
)]
pub struct Cli {
    /// Generate: SUBJECT CONFIG TARGET. Reuse: TARGET, extras are ignored
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Skip learning and refine this previously produced model
    #[arg(long, value_name = "MODEL")]
    pub existing_model: Option<PathBuf>,

    /// Directory holding model.xml; tools run here (default: current dir)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Tool command config (JSON)
    #[arg(long, value_name = "PATH")]
    pub tools: Option<PathBuf>,

    /// Compiler command template
    #[arg(long, value_name = "CMD")]
    pub compiler: Option<String>,

    /// Learner command template
    #[arg(long, value_name = "CMD")]
    pub learner: Option<String>,

    /// Refiner command template
    #[arg(long, value_name = "CMD")]
    pub refiner: Option<String>,

    /// Log stage and tool detail to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    pub fn request(&self) -> Result<PipelineRequest, RequestError> {
        PipelineRequest::from_args(self.existing_model.clone(), self.args.clone())
    }

    pub fn overrides(&self) -> ToolOverrides {
        ToolOverrides {
            compiler: self.compiler.clone(),
            learner: self.learner.clone(),
            refiner: self.refiner.clone(),
        }
    }
}
