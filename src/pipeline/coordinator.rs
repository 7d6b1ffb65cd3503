use super::{RunObserver, RunReport, RunState, Stage, StageResult, StageStatus};
use crate::error::StageError;
use crate::model::{self, Extraction, NormalizeOutcome, SymbolSet};
use crate::paths::{absolutize, same_file, WorkPaths};
use crate::request::{Mode, PipelineRequest};
use crate::subject::{read_class_file, Subject};
use crate::tools::{Launcher, Toolchain};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Drives one request through the stage table.
///
/// The coordinator owns the working `model.xml` for the duration of a run.
/// Two coordinators sharing a work dir will clobber each other's model.
pub struct Coordinator<'a> {
    toolchain: &'a Toolchain,
    paths: &'a WorkPaths,
    launcher: &'a mut dyn Launcher,
    observer: &'a mut dyn RunObserver,
}

/// What a stage hands back when it does not fail.
struct StageOutcome {
    status: StageStatus,
    message: Option<String>,
    catalogue: Vec<String>,
}

impl StageOutcome {
    fn passed(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Passed,
            message: Some(message.into()),
            catalogue: Vec::new(),
        }
    }

    fn skipped(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Skipped,
            message: Some(message.into()),
            catalogue: Vec::new(),
        }
    }

    fn warned(message: impl Into<String>, catalogue: Vec<String>) -> Self {
        Self {
            status: StageStatus::Warned,
            message: Some(message.into()),
            catalogue,
        }
    }

    fn with_catalogue(mut self, catalogue: Vec<String>) -> Self {
        self.catalogue = catalogue;
        self
    }
}

/// Values carried between stages of a single run.
#[derive(Default)]
struct RunScratch {
    subject_path: Option<PathBuf>,
    subject: Option<Subject>,
    config: Option<PathBuf>,
    existing_model: Option<PathBuf>,
    symbols: Option<SymbolSet>,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        toolchain: &'a Toolchain,
        paths: &'a WorkPaths,
        launcher: &'a mut dyn Launcher,
        observer: &'a mut dyn RunObserver,
    ) -> Self {
        Self {
            toolchain,
            paths,
            launcher,
            observer,
        }
    }

    /// Run every stage for `request` until the run is done or a stage fails.
    pub fn run(&mut self, request: &PipelineRequest) -> RunReport {
        let mode = request.mode();
        let mut scratch = RunScratch::default();
        let mut stages = Vec::new();
        let mut state = RunState::Running(Stage::FIRST);
        tracing::info!(
            mode = mode.as_str(),
            symbol = request.target_symbol(),
            "pipeline start"
        );

        while let RunState::Running(stage) = state {
            self.observer.stage_started(stage);
            let start = Instant::now();
            let outcome = self.execute(stage, request, &mut scratch);
            let elapsed_ms = start.elapsed().as_millis();

            let result = match outcome {
                Ok(outcome) => StageResult {
                    stage,
                    status: outcome.status,
                    message: outcome.message,
                    catalogue: outcome.catalogue,
                    elapsed_ms,
                },
                Err(err) => {
                    tracing::error!(stage = stage.label(), error = %err, "stage failed");
                    StageResult {
                        stage,
                        status: StageStatus::Failed,
                        message: Some(err.to_string()),
                        catalogue: Vec::new(),
                        elapsed_ms,
                    }
                }
            };
            tracing::info!(
                stage = stage.label(),
                status = ?result.status,
                elapsed_ms,
                "stage complete"
            );
            self.observer.stage_finished(&result);
            state = RunState::advance(stage, result.status, mode);
            stages.push(result);
        }

        RunReport {
            mode,
            final_state: state,
            stages,
            symbols: scratch.symbols,
        }
    }

    fn execute(
        &mut self,
        stage: Stage,
        request: &PipelineRequest,
        scratch: &mut RunScratch,
    ) -> Result<StageOutcome, StageError> {
        match stage {
            Stage::ResolveMode => self.resolve_mode(request, scratch),
            Stage::CompileSubjectIfNeeded => self.compile_subject(scratch),
            Stage::VerifyTargetInSubject => self.verify_target_in_subject(request, scratch),
            Stage::InvokeLearningTool => self.invoke_learner(scratch),
            Stage::NormalizeModel => self.normalize_model(),
            Stage::ValidateExistingModel => self.validate_existing_model(scratch),
            Stage::CopyModelToWorkingPath => self.copy_model(scratch),
            Stage::ExtractSymbols => self.extract_symbols(scratch),
            Stage::CheckTargetInModel => self.check_target_in_model(request, scratch),
            Stage::InvokeRefinementTool => self.invoke_refiner(request),
        }
    }

    fn resolve_mode(
        &self,
        request: &PipelineRequest,
        scratch: &mut RunScratch,
    ) -> Result<StageOutcome, StageError> {
        match request.mode() {
            Mode::Generate => {
                scratch.subject_path = request.subject_path().map(resolve_input).transpose()?;
                scratch.config = request.config_path().map(resolve_input).transpose()?;
                Ok(StageOutcome::passed("generate a new model"))
            }
            Mode::Reuse => {
                scratch.existing_model = request
                    .existing_model_path()
                    .map(resolve_input)
                    .transpose()?;
                let extras = request.ignored_args();
                if extras.is_empty() {
                    Ok(StageOutcome::passed("reuse an existing model"))
                } else {
                    Ok(StageOutcome::passed(format!(
                        "reuse an existing model; ignoring extra arguments: {}",
                        extras.join(" ")
                    )))
                }
            }
        }
    }

    fn compile_subject(&mut self, scratch: &mut RunScratch) -> Result<StageOutcome, StageError> {
        let subject_path = scratch
            .subject_path
            .as_deref()
            .ok_or_else(|| missing_input("subject file"))?;
        let subject = scratch.subject.insert(Subject::resolve(subject_path)?);
        if !subject.needs_compilation() {
            return Ok(StageOutcome::skipped(format!(
                "{} is already compiled",
                subject.path().display()
            )));
        }
        self.toolchain.compile(&mut *self.launcher, subject.path())?;
        Ok(StageOutcome::passed(format!(
            "compiled {}",
            subject.path().display()
        )))
    }

    fn verify_target_in_subject(
        &self,
        request: &PipelineRequest,
        scratch: &RunScratch,
    ) -> Result<StageOutcome, StageError> {
        let subject = scratch
            .subject
            .as_ref()
            .ok_or_else(|| missing_input("subject file"))?;
        let class = read_class_file(&subject.class_file())?;
        let target = request.target_symbol();
        if class.declares(target) {
            return Ok(StageOutcome::passed(format!(
                "target method found in {}: {target}",
                class.class_name
            )));
        }
        tracing::warn!(
            symbol = target,
            class = %class.class_name,
            "target method not declared by subject"
        );
        Ok(StageOutcome::warned(
            format!(
                "target method not found in {}: {target}; proceeding anyway, \
                 pass the exact name used in the model",
                class.class_name
            ),
            class.methods,
        ))
    }

    fn invoke_learner(&mut self, scratch: &RunScratch) -> Result<StageOutcome, StageError> {
        let config = scratch
            .config
            .as_deref()
            .ok_or_else(|| missing_input("learner config"))?;
        self.toolchain.learn(&mut *self.launcher, config)?;
        Ok(StageOutcome::passed("learner completed"))
    }

    fn normalize_model(&self) -> Result<StageOutcome, StageError> {
        let model_path = self.paths.model_path();
        match model::normalize(&model_path)? {
            NormalizeOutcome::Rewritten { replacements } => Ok(StageOutcome::passed(format!(
                "cleaned {} ({replacements} identifiers unquoted)",
                model_path.display()
            ))),
            NormalizeOutcome::Missing => Err(StageError::Precondition {
                what: "learner model",
                path: model_path,
            }),
        }
    }

    fn validate_existing_model(&self, scratch: &RunScratch) -> Result<StageOutcome, StageError> {
        let existing = existing_model_of(scratch)?;
        model::check_document_start(existing)?;
        Ok(StageOutcome::passed(format!(
            "using existing model {}",
            existing.display()
        )))
    }

    fn copy_model(&self, scratch: &RunScratch) -> Result<StageOutcome, StageError> {
        let existing = existing_model_of(scratch)?;
        let model_path = self.paths.model_path();
        if same_file(existing, &model_path) {
            return Ok(StageOutcome::skipped("model is already at the working path"));
        }
        fs::copy(existing, &model_path)
            .map_err(|err| StageError::io("copy model to", &model_path, err))?;
        Ok(StageOutcome::passed(format!(
            "copied {} to {}",
            existing.display(),
            model_path.display()
        )))
    }

    fn extract_symbols(&self, scratch: &mut RunScratch) -> Result<StageOutcome, StageError> {
        let model_path = self.paths.model_path();
        let symbols = match model::extract(&model_path)? {
            Extraction::Found(symbols) => symbols,
            Extraction::NotFound => {
                return Err(StageError::Precondition {
                    what: "working model",
                    path: model_path,
                })
            }
        };
        if symbols.is_empty() {
            tracing::warn!(path = %model_path.display(), "model declares no symbols");
        }
        let outcome = StageOutcome::passed(format!("{} symbols declared", symbols.len()))
            .with_catalogue(symbols.as_slice().to_vec());
        scratch.symbols = Some(symbols);
        Ok(outcome)
    }

    fn check_target_in_model(
        &self,
        request: &PipelineRequest,
        scratch: &RunScratch,
    ) -> Result<StageOutcome, StageError> {
        let target = request.target_symbol();
        let symbols = scratch.symbols.as_ref().ok_or_else(|| missing_input("symbols"))?;
        if symbols.contains(target) {
            return Ok(StageOutcome::passed(format!("target symbol found: {target}")));
        }
        tracing::warn!(
            symbol = target,
            available = symbols.len(),
            "target symbol not declared by model"
        );
        Ok(StageOutcome::warned(
            format!("target symbol not found in model: {target}; proceeding anyway"),
            symbols.as_slice().to_vec(),
        ))
    }

    fn invoke_refiner(&mut self, request: &PipelineRequest) -> Result<StageOutcome, StageError> {
        self.toolchain.refine(
            &mut *self.launcher,
            &self.paths.model_path(),
            request.target_symbol(),
        )?;
        Ok(StageOutcome::passed("refiner completed"))
    }
}

fn resolve_input(path: &Path) -> Result<PathBuf, StageError> {
    absolutize(path).map_err(|err| StageError::io("resolve", path, err))
}

fn existing_model_of(scratch: &RunScratch) -> Result<&Path, StageError> {
    scratch
        .existing_model
        .as_deref()
        .ok_or_else(|| missing_input("existing model"))
}

fn missing_input(what: &'static str) -> StageError {
    StageError::Precondition {
        what,
        path: PathBuf::new(),
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
