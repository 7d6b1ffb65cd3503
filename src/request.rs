//! Immutable description of one pipeline run.
//!
//! A request carries either the generate inputs (subject + learner config) or
//! a pre-built model, never both. Every stage reads from the same value, so
//! there is no run-wide mutable state.
use crate::error::RequestError;
use std::path::{Path, PathBuf};

/// How the model artifact for a run is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compile the subject and drive the learner to produce a fresh model.
    Generate,
    /// Validate and copy a model produced by an earlier run.
    Reuse,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Generate => "generate",
            Mode::Reuse => "reuse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ModelSource {
    Generate { subject: PathBuf, config: PathBuf },
    Reuse { existing_model: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    source: ModelSource,
    target_symbol: String,
    ignored_args: Vec<String>,
}

impl PipelineRequest {
    pub fn generate(
        subject: impl Into<PathBuf>,
        config: impl Into<PathBuf>,
        target_symbol: impl Into<String>,
    ) -> Result<Self, RequestError> {
        Self::build(
            ModelSource::Generate {
                subject: subject.into(),
                config: config.into(),
            },
            target_symbol.into(),
        )
    }

    pub fn reuse(
        existing_model: impl Into<PathBuf>,
        target_symbol: impl Into<String>,
    ) -> Result<Self, RequestError> {
        Self::build(
            ModelSource::Reuse {
                existing_model: existing_model.into(),
            },
            target_symbol.into(),
        )
    }

    /// Build a request from loosely populated fields, enforcing that exactly
    /// one of `{subject + config}` or `{existing_model}` is present.
    pub fn from_parts(
        subject: Option<PathBuf>,
        config: Option<PathBuf>,
        existing_model: Option<PathBuf>,
        target_symbol: String,
    ) -> Result<Self, RequestError> {
        match (existing_model, subject, config) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(RequestError::ConflictingModes),
            (Some(existing_model), None, None) => Self::reuse(existing_model, target_symbol),
            (None, Some(subject), Some(config)) => Self::generate(subject, config, target_symbol),
            (None, _, _) => Err(RequestError::MissingMode),
        }
    }

    /// Resolve a request from raw command-line positionals.
    ///
    /// Generate mode takes exactly `<subject> <config> <target>`. Reuse mode
    /// takes `<target>` and records any trailing extras as ignored.
    pub fn from_args(
        existing_model: Option<PathBuf>,
        positionals: Vec<String>,
    ) -> Result<Self, RequestError> {
        match existing_model {
            Some(existing_model) => {
                let mut positionals = positionals.into_iter();
                let target = positionals.next().ok_or(RequestError::Arity {
                    expected: 1,
                    got: 0,
                })?;
                let mut request = Self::from_parts(None, None, Some(existing_model), target)?;
                request.ignored_args = positionals.collect();
                Ok(request)
            }
            None => {
                let got = positionals.len();
                let [subject, config, target]: [String; 3] = positionals
                    .try_into()
                    .map_err(|_| RequestError::Arity { expected: 3, got })?;
                Self::from_parts(Some(subject.into()), Some(config.into()), None, target)
            }
        }
    }

    fn build(source: ModelSource, target_symbol: String) -> Result<Self, RequestError> {
        if target_symbol.trim().is_empty() {
            return Err(RequestError::EmptyTarget);
        }
        Ok(Self {
            source,
            target_symbol,
            ignored_args: Vec::new(),
        })
    }

    pub fn mode(&self) -> Mode {
        match self.source {
            ModelSource::Generate { .. } => Mode::Generate,
            ModelSource::Reuse { .. } => Mode::Reuse,
        }
    }

    pub fn target_symbol(&self) -> &str {
        &self.target_symbol
    }

    pub fn subject_path(&self) -> Option<&Path> {
        match &self.source {
            ModelSource::Generate { subject, .. } => Some(subject),
            ModelSource::Reuse { .. } => None,
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        match &self.source {
            ModelSource::Generate { config, .. } => Some(config),
            ModelSource::Reuse { .. } => None,
        }
    }

    pub fn existing_model_path(&self) -> Option<&Path> {
        match &self.source {
            ModelSource::Reuse { existing_model } => Some(existing_model),
            ModelSource::Generate { .. } => None,
        }
    }

    /// Trailing reuse-mode arguments that were accepted but not used.
    pub fn ignored_args(&self) -> &[String] {
        &self.ignored_args
    }
}
