//! Dependency-manifest model.
//!
//! A manifest is an ordered sequence of `name==constraint` lines (bare `name`
//! is allowed), one entry per line. Entries are unique by package name —
//! regeneration is logically a pure function of the source tree's imports, so
//! a duplicate means the generator misbehaved and parsing rejects it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// A single `(package-name, version-constraint)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// The remainder of the line after the name: `==1.2.3`, `>=2,<3`, etc.
    /// `None` for an unconstrained bare name.
    pub constraint: Option<String>,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}{}", self.name, c),
            None => f.write_str(&self.name),
        }
    }
}

/// A parsed manifest: ordered entries, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse manifest text. Blank lines and `#` comments are ignored.
    ///
    /// Returns [`ManifestError::DuplicatePackage`] if a name repeats (names
    /// compare case-insensitively, the PyPI convention) and
    /// [`ManifestError::MalformedEntry`] for a line with no leading name.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut entries: Vec<ManifestEntry> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let split = line
                .find(|c: char| !(c.is_ascii_alphanumeric() || "-_.[]".contains(c)))
                .unwrap_or(line.len());
            if split == 0 {
                return Err(ManifestError::MalformedEntry {
                    line: idx + 1,
                    text: line.to_owned(),
                });
            }

            let name = &line[..split];
            let rest = line[split..].trim();
            if entries.iter().any(|e| e.name.eq_ignore_ascii_case(name)) {
                return Err(ManifestError::DuplicatePackage {
                    name: name.to_owned(),
                    line: idx + 1,
                });
            }

            entries.push(ManifestEntry {
                name: name.to_owned(),
                constraint: if rest.is_empty() {
                    None
                } else {
                    Some(rest.to_owned())
                },
            });
        }

        Ok(Self { entries })
    }

    /// Serialize back to line-oriented text, one entry per line, trailing
    /// newline included.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Look up an entry by package name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_pinned_and_bare_entries() {
        let m = Manifest::parse("requests==2.31.0\npyyaml\n").expect("parse");
        assert_eq!(m.entries.len(), 2);
        assert_eq!(m.entries[0].name, "requests");
        assert_eq!(m.entries[0].constraint.as_deref(), Some("==2.31.0"));
        assert_eq!(m.entries[1].name, "pyyaml");
        assert_eq!(m.entries[1].constraint, None);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let m = Manifest::parse("# generated\n\nrequests==2.31.0\n").expect("parse");
        assert_eq!(m.entries.len(), 1);
    }

    #[test]
    fn rejects_duplicate_names_case_insensitively() {
        let err = Manifest::parse("PyYAML==6.0\npyyaml==5.4\n").unwrap_err();
        match err {
            ManifestError::DuplicatePackage { name, line } => {
                assert_eq!(name, "pyyaml");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_line_with_no_name() {
        let err = Manifest::parse("==1.0\n").unwrap_err();
        assert!(matches!(err, ManifestError::MalformedEntry { line: 1, .. }));
    }

    #[rstest]
    #[case("requests==2.31.0\npyyaml>=6\n")]
    #[case("flask[async]==3.0.0\n")]
    #[case("")]
    fn to_text_round_trips(#[case] text: &str) {
        let m = Manifest::parse(text).expect("parse");
        assert_eq!(m.to_text(), text);
    }

    #[test]
    fn get_is_case_insensitive() {
        let m = Manifest::parse("PyYAML==6.0\n").expect("parse");
        assert!(m.get("pyyaml").is_some());
        assert!(m.get("requests").is_none());
    }
}
