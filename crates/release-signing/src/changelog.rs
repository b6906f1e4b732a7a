//! Per-version release notes.

use std::collections::BTreeMap;

/// Changelog entries keyed by version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    entries: BTreeMap<String, String>,
}

impl Changelog {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Notes for `version`, trimmed of surrounding whitespace.
    ///
    /// Versions without an entry get a generic placeholder so the manifest
    /// never ships an empty changelog.
    pub fn entry_for(&self, version: &str) -> String {
        match self.entries.get(version) {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => fallback_entry(version),
        }
    }
}

/// Placeholder notes for a version with no changelog entry.
pub fn fallback_entry(version: &str) -> String {
    format!("### {version}\n- Bug fixes and improvements")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changelog() -> Changelog {
        let mut entries = BTreeMap::new();
        entries.insert("3.1.3".to_string(), "\n### 3.1.3 - Security Fix\n- Plugin URI header added\n".to_string());
        entries.insert("3.1.2".to_string(), "   \n".to_string());
        Changelog::new(entries)
    }

    #[test]
    fn known_version_is_trimmed() {
        assert_eq!(changelog().entry_for("3.1.3"), "### 3.1.3 - Security Fix\n- Plugin URI header added");
    }

    #[test]
    fn unknown_version_falls_back() {
        let entry = changelog().entry_for("9.9.9");
        assert_eq!(entry, "### 9.9.9\n- Bug fixes and improvements");
        assert!(entry.contains("9.9.9"));
    }

    #[test]
    fn blank_entry_falls_back() {
        assert_eq!(changelog().entry_for("3.1.2"), fallback_entry("3.1.2"));
    }

    #[test]
    fn empty_table_falls_back() {
        assert_eq!(Changelog::default().entry_for("1.0.0"), "### 1.0.0\n- Bug fixes and improvements");
    }
}
