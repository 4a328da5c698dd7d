use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Names of the classes the bundled harbor model was trained on, by index.
pub const DEFAULT_LABELS: [&str; 4] = ["ship", "cargo", "island", "cloud"];
const UNKNOWN_LABEL: &str = "object";

/// Class index to name, as shipped next to the model weights.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self { names: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect() }
    }
}

impl LabelTable {
    /// One name per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading label table {}", path.display()))?;
        let table = Self::parse(&text);
        anyhow::ensure!(!table.names.is_empty(), "label table {} is empty", path.display());
        Ok(table)
    }

    pub fn name(&self, class_id: usize) -> &str {
        self.names.get(class_id).map(String::as_str).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_table_maps_harbor_classes() {
        let t = LabelTable::default();
        assert_eq!(t.name(0), "ship");
        assert_eq!(t.name(3), "cloud");
        assert_eq!(t.name(42), "object");
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let t = LabelTable::parse("# classes\nship\n\n  cargo  \n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.name(1), "cargo");
    }

    #[test]
    fn from_file_rejects_empty_table() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# nothing here").unwrap();
        assert!(LabelTable::from_file(f.path()).is_err());
    }
}
