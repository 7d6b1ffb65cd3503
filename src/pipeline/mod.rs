//! Stage sequencing for one learn-then-refine run.
//!
//! Stages and their order live in [`Stage::next`], a flat transition table
//! keyed on the request mode. A failed stage moves the run to
//! [`RunState::Failed`] and nothing after it executes.
mod coordinator;

pub use coordinator::Coordinator;

use crate::model::SymbolSet;
use crate::request::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolveMode,
    CompileSubjectIfNeeded,
    VerifyTargetInSubject,
    InvokeLearningTool,
    NormalizeModel,
    ValidateExistingModel,
    CopyModelToWorkingPath,
    ExtractSymbols,
    CheckTargetInModel,
    InvokeRefinementTool,
}

impl Stage {
    pub const FIRST: Stage = Stage::ResolveMode;

    pub fn label(self) -> &'static str {
        match self {
            Stage::ResolveMode => "resolve mode",
            Stage::CompileSubjectIfNeeded => "compile subject",
            Stage::VerifyTargetInSubject => "verify target in subject",
            Stage::InvokeLearningTool => "learn model",
            Stage::NormalizeModel => "normalize model",
            Stage::ValidateExistingModel => "validate existing model",
            Stage::CopyModelToWorkingPath => "copy model",
            Stage::ExtractSymbols => "extract symbols",
            Stage::CheckTargetInModel => "check target in model",
            Stage::InvokeRefinementTool => "refine",
        }
    }

    /// Successor on success, or `None` when the run is complete.
    pub fn next(self, mode: Mode) -> Option<Stage> {
        use Stage::*;
        match (self, mode) {
            (ResolveMode, Mode::Generate) => Some(CompileSubjectIfNeeded),
            (ResolveMode, Mode::Reuse) => Some(ValidateExistingModel),
            (CompileSubjectIfNeeded, _) => Some(VerifyTargetInSubject),
            (VerifyTargetInSubject, _) => Some(InvokeLearningTool),
            (InvokeLearningTool, _) => Some(NormalizeModel),
            (NormalizeModel, _) => Some(ExtractSymbols),
            (ValidateExistingModel, _) => Some(CopyModelToWorkingPath),
            (CopyModelToWorkingPath, _) => Some(ExtractSymbols),
            (ExtractSymbols, _) => Some(CheckTargetInModel),
            (CheckTargetInModel, _) => Some(InvokeRefinementTool),
            (InvokeRefinementTool, _) => None,
        }
    }

    /// Every stage a fully successful run of `mode` visits, in order.
    pub fn sequence(mode: Mode) -> Vec<Stage> {
        let mut stages = vec![Stage::FIRST];
        let mut current = Stage::FIRST;
        while let Some(next) = current.next(mode) {
            stages.push(next);
            current = next;
        }
        stages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Passed,
    /// Not applicable for this request (e.g. subject already compiled).
    Skipped,
    /// Soft mismatch: reported, but the run continues.
    Warned,
    Failed,
}

impl StageStatus {
    pub fn proceeds(self) -> bool {
        !matches!(self, StageStatus::Failed)
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    pub message: Option<String>,
    /// Names worth showing the operator: declared methods on a subject
    /// mismatch, or the extracted model symbols.
    pub catalogue: Vec<String>,
    pub elapsed_ms: u128,
}

impl StageResult {
    /// One-line diagnostic, when the stage has something to say.
    pub fn diagnostic(&self) -> Option<String> {
        self.message
            .as_ref()
            .map(|message| format!("{}: {message}", self.stage.label()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running(Stage),
    Done,
    Failed(Stage),
}

impl RunState {
    /// Step the machine after `stage` finished with `status`.
    pub fn advance(stage: Stage, status: StageStatus, mode: Mode) -> RunState {
        if !status.proceeds() {
            return RunState::Failed(stage);
        }
        match stage.next(mode) {
            Some(next) => RunState::Running(next),
            None => RunState::Done,
        }
    }
}

/// Everything a run produced, for the presentation layer to render.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: Mode,
    pub final_state: RunState,
    pub stages: Vec<StageResult>,
    pub symbols: Option<SymbolSet>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.final_state == RunState::Done
    }

    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stages
            .iter()
            .find(|result| result.status == StageStatus::Failed)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StageResult> {
        self.stages
            .iter()
            .filter(|result| result.status == StageStatus::Warned)
    }

    pub fn diagnostics(&self) -> Vec<String> {
        self.stages
            .iter()
            .filter_map(StageResult::diagnostic)
            .collect()
    }
}

/// Receives stage progress as the run happens.
pub trait RunObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_finished(&mut self, _result: &StageResult) {}
}
