//! ignore policy: which working-tree paths stay out of the object store
//!
//! patterns come from the repository config and from a `.csetignore` file in
//! the working tree root (one glob per line, `#` starts a comment). a pattern
//! without a `/` matches any single path component; a pattern with a `/` is
//! matched against the whole relative path. the store directory itself is
//! always ignored.

use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, IoResultExt, Result};
use crate::repo::STORE_DIR;

/// name of the per-working-tree ignore file
pub const IGNORE_FILE: &str = ".csetignore";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct Rule {
    pattern: Pattern,
    anchored: bool,
}

/// compiled ignore patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

impl IgnoreRules {
    /// compile the given patterns plus the store directory
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut rules = IgnoreRules::default();
        rules.add(STORE_DIR)?;
        for pattern in patterns {
            rules.add(pattern.as_ref())?;
        }
        Ok(rules)
    }

    /// compile config patterns and the root's ignore file, if any
    pub fn load<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self> {
        let mut rules = Self::new(patterns)?;

        let ignore_file = root.join(IGNORE_FILE);
        let content = match std::fs::read_to_string(&ignore_file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(rules),
            Err(e) => return Err(e).with_path(&ignore_file),
        };

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            rules.add(line)?;
        }
        Ok(rules)
    }

    fn add(&mut self, raw: &str) -> Result<()> {
        let trimmed = raw.trim_start_matches('/').trim_end_matches('/');
        let pattern = Pattern::new(trimmed).map_err(|e| Error::InvalidIgnorePattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?;
        self.rules.push(Rule {
            pattern,
            anchored: trimmed.contains('/'),
        });
        Ok(())
    }

    /// is the working-tree relative path ignored
    ///
    /// a path is also ignored when any of its parent directories is.
    pub fn is_ignored(&self, path: &str) -> bool {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return false;
        }

        let components: Vec<&str> = path.split('/').collect();
        self.rules.iter().any(|rule| {
            if rule.anchored {
                // match the path or any of its ancestors
                (1..=components.len()).any(|n| {
                    rule.pattern
                        .matches_with(&components[..n].join("/"), MATCH_OPTIONS)
                })
            } else {
                components
                    .iter()
                    .any(|c| rule.pattern.matches_with(c, MATCH_OPTIONS))
            }
        })
    }
}
