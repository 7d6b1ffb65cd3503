//! In-place quoting cleanup for learner output.
//!
//! The learner emits register and parameter identifiers such as `'r1'` or
//! `'p2'` with single quotes; the refiner expects them bare.
use crate::error::StageError;
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// Result of normalizing a model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// The file was rewritten; `replacements` quoted tokens were stripped.
    Rewritten { replacements: usize },
    /// No file at the path; nothing was written.
    Missing,
}

fn quoted_identifier() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"'([rp][0-9]+)'").expect("regex for quoted identifiers"))
}

/// Strip single quotes around `r<digits>` / `p<digits>` tokens.
pub fn normalize_text(text: &str) -> Cow<'_, str> {
    quoted_identifier().replace_all(text, "$1")
}

/// Rewrite the model at `path` in canonical quoting form.
///
/// The replacement is staged in a sibling temp file and renamed over the
/// original, so readers never observe a partially written model.
pub fn normalize(path: &Path) -> Result<NormalizeOutcome, StageError> {
    if !path.is_file() {
        return Ok(NormalizeOutcome::Missing);
    }
    let text = fs::read_to_string(path).map_err(|err| StageError::io("read", path, err))?;
    let permissions = fs::metadata(path)
        .map_err(|err| StageError::io("stat", path, err))?
        .permissions();
    let replacements = quoted_identifier().find_iter(&text).count();
    let normalized = normalize_text(&text);

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(parent)
        .map_err(|err| StageError::io("stage", parent, err))?;
    staged
        .write_all(normalized.as_bytes())
        .map_err(|err| StageError::io("write", staged.path().to_path_buf(), err))?;
    // The staged file starts out 0600; the model keeps its original mode.
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(|err| StageError::io("chmod", staged.path().to_path_buf(), err))?;
    staged
        .persist(path)
        .map_err(|err| StageError::io("replace", path, err.error))?;

    tracing::debug!(replacements, path = %path.display(), "model normalized");
    Ok(NormalizeOutcome::Rewritten { replacements })
}
