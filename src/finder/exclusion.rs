use std::path::Path;

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    // `*` stays within one path segment, `**` spans segments.
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled set of exclusion globs.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    patterns: Vec<Pattern>,
}

impl Exclusions {
    /// Compile `patterns`. Invalid globs are skipped with a warning.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                match Pattern::new(raw) {
                    Ok(pattern) => Some(pattern),
                    Err(err) => {
                        tracing::warn!(pattern = raw, error = %err, "ignoring invalid exclusion");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// True if any pattern matches the file name, the path relative to `root`,
    /// or the path as given.
    pub fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let full = to_slash(path);
        let relative = path.strip_prefix(root).ok().map(to_slash);
        let base = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        let candidates = [base.as_deref(), relative.as_deref(), Some(full.as_str())];

        self.patterns.iter().any(|pattern| {
            candidates
                .iter()
                .flatten()
                .filter(|candidate| !candidate.is_empty())
                .any(|candidate| pattern.matches_with(candidate, MATCH_OPTIONS))
        })
    }
}

fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    let s = s.strip_prefix("./").unwrap_or(&s);
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.to_string()
    }
}
