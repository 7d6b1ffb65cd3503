//! Typed paths into the working directory.
//!
//! Every stage derives artifact locations from here so the learner, the
//! normalizer, and the refiner agree on where the model lives.
use std::path::{Path, PathBuf};

/// File name the learner writes and the refiner reads.
pub const MODEL_FILE_NAME: &str = "model.xml";

/// Per-directory tool config picked up when `--tools` is not given.
pub const LOCAL_TOOLS_FILE_NAME: &str = "crefine.json";

#[derive(Debug, Clone)]
pub struct WorkPaths {
    root: PathBuf,
}

impl WorkPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Return the working directory children are launched in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the working `model.xml` path.
    pub fn model_path(&self) -> PathBuf {
        self.root.join(MODEL_FILE_NAME)
    }

    /// Return the `crefine.json` path.
    pub fn local_tools_path(&self) -> PathBuf {
        self.root.join(LOCAL_TOOLS_FILE_NAME)
    }
}

/// Anchor a relative path at the process working directory.
///
/// Child tools run inside the work dir, so caller-relative paths must be
/// fixed before they are handed over.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

/// True when both paths resolve to the same existing file.
pub fn same_file(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
