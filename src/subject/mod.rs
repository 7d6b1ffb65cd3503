//! The program under analysis and how to reach its compiled form.
//!
//! A `.java` subject is source text that has to go through the compiler
//! first; anything else is taken as already compiled. Either way the class
//! file sits next to the subject, named after its stem.
mod classfile;

pub use classfile::read_class_file;

use crate::error::StageError;
use std::path::{Path, PathBuf};

const SOURCE_EXTENSION: &str = "java";
const CLASS_EXTENSION: &str = "class";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Source,
    Compiled,
}

#[derive(Debug, Clone)]
pub struct Subject {
    path: PathBuf,
    kind: SubjectKind,
}

impl Subject {
    /// Classify an existing subject path.
    pub fn resolve(path: &Path) -> Result<Self, StageError> {
        if !path.exists() {
            return Err(StageError::Precondition {
                what: "subject file",
                path: path.to_path_buf(),
            });
        }
        let kind = match path.extension().and_then(|ext| ext.to_str()) {
            Some(SOURCE_EXTENSION) => SubjectKind::Source,
            _ => SubjectKind::Compiled,
        };
        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn needs_compilation(&self) -> bool {
        self.kind == SubjectKind::Source
    }

    /// Location of the compiled class for this subject.
    pub fn class_file(&self) -> PathBuf {
        self.path.with_extension(CLASS_EXTENSION)
    }
}
