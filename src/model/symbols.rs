//! Symbol discovery over a model artifact.
use crate::error::StageError;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Ordered set of symbol names; iteration follows first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name` unless already present. Returns true when it was new.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<'a> FromIterator<&'a str> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = SymbolSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Result of scanning a model file for declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(SymbolSet),
    /// No file at the path. Distinct from a model that declares nothing.
    NotFound,
}

fn symbol_declaration() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<symbol name="([^"]+)""#).expect("regex for symbol declarations")
    })
}

fn symbols_on_line(line: &str) -> impl Iterator<Item = &str> {
    symbol_declaration()
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str())
}

/// Collect declared symbol names from in-memory model text.
pub fn extract_from_text(text: &str) -> SymbolSet {
    text.lines().flat_map(symbols_on_line).collect()
}

/// Collect declared symbol names from the model at `path`, line by line.
pub fn extract(path: &Path) -> Result<Extraction, StageError> {
    if !path.is_file() {
        return Ok(Extraction::NotFound);
    }
    let text = fs::read_to_string(path).map_err(|err| StageError::io("read", path, err))?;
    Ok(Extraction::Found(extract_from_text(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn duplicates_keep_first_position() {
        let text = "<symbol name=\"push\"/>\n<symbol name=\"pop\"/>\n<symbol name=\"push\"/>\n";
        let symbols = extract_from_text(text);
        assert_eq!(symbols.as_slice(), &["push".to_string(), "pop".to_string()]);
    }

    #[test]
    fn every_declaration_on_a_line_is_recognized() {
        let text = "<symbol name=\"push\"/><symbol name=\"pop\"/><symbol name=\"push\"/>";
        let symbols = extract_from_text(text);
        assert_eq!(symbols.as_slice(), &["push".to_string(), "pop".to_string()]);
    }

    #[test]
    fn ignores_lines_without_declarations() {
        let text = "<?xml version=\"1.0\"?>\n<register-automaton>\n  <symbol name=\"IPush\">\n    <param type=\"int\" name=\"p1\"/>\n  </symbol>\n  <location name=\"l0\"/>\n</register-automaton>\n";
        let symbols = extract_from_text(text);
        assert_eq!(symbols.as_slice(), &["IPush".to_string()]);
        assert!(symbols.contains("IPush"));
        assert!(!symbols.contains("l0"));
    }

    #[test]
    fn extraction_is_repeatable() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("model.xml");
        std::fs::write(
            &path,
            "<symbol name=\"a\"/>\n<symbol name=\"b\"/>\n<symbol name=\"a\"/>\n<symbol name=\"c\"/>\n",
        )
        .expect("write model");

        let first = extract(&path).expect("first extract");
        let second = extract(&path).expect("second extract");
        assert_eq!(first, second);
        let Extraction::Found(symbols) = first else {
            panic!("model should be found");
        };
        assert_eq!(symbols.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn missing_file_is_not_an_empty_set() {
        let dir = TempDir::new().expect("temp dir");
        let missing = extract(&dir.path().join("model.xml")).expect("extract");
        assert_eq!(missing, Extraction::NotFound);

        let empty_path = dir.path().join("empty.xml");
        std::fs::write(&empty_path, "<?xml version=\"1.0\"?>\n").expect("write");
        assert_eq!(
            extract(&empty_path).expect("extract"),
            Extraction::Found(SymbolSet::new())
        );
    }
}
