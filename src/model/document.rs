use crate::error::StageError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Marker every accepted model document starts with.
pub const DOCUMENT_START_MARKER: &str = "<?xml";

/// Check that `path` names a readable model that opens with the XML
/// declaration. This is the only validity check applied to reused models.
pub fn check_document_start(path: &Path) -> Result<(), StageError> {
    if !path.exists() {
        return Err(StageError::Precondition {
            what: "existing model",
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(StageError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::InvalidData => StageError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "not valid UTF-8".to_string(),
        },
        _ => StageError::io("read", path, err),
    })?;
    let body = text.strip_prefix('\u{feff}').unwrap_or(&text).trim_start();
    if body.is_empty() {
        return Err(StageError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "document is empty".to_string(),
        });
    }
    if !body.starts_with(DOCUMENT_START_MARKER) {
        let first_line = body.lines().next().unwrap_or_default();
        return Err(StageError::InvalidDocument {
            path: path.to_path_buf(),
            reason: format!("expected `{DOCUMENT_START_MARKER}` at start, found `{first_line}`"),
        });
    }
    Ok(())
}
