//! Discovery of manifest and lock files.
//!
//! [`Finder::get_groups`] walks a directory tree, drops excluded and hidden
//! entries, binds each remaining file to the first matching format of the
//! [`Registry`] and hands the matches to [`grouper::group`].

pub mod exclusion;
pub mod grouper;

use std::path::Path;
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use crate::error::FinderError;
use crate::models::{FileGroups, Strictness};
use crate::registry::{CompiledFormat, Registry};

pub use exclusion::Exclusions;
use grouper::FileMatch;

pub struct Finder {
    registry: Arc<Registry>,
}

impl Finder {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn formats(&self) -> &[Arc<CompiledFormat>] {
        self.registry.formats()
    }

    /// Walk `root` and group every supported file that survives `exclusions`.
    pub fn get_groups<S: AsRef<str>>(
        &self,
        root: &Path,
        exclusions: &[S],
        include_hidden: bool,
        strictness: Strictness,
    ) -> Result<FileGroups, FinderError> {
        let exclusions = Exclusions::new(exclusions);
        let matches = self.find_matches(root, &exclusions, include_hidden)?;
        tracing::debug!(root = %root.display(), matches = matches.len(), "walk finished");
        Ok(grouper::group(matches, strictness))
    }

    fn find_matches(
        &self,
        root: &Path,
        exclusions: &Exclusions,
        include_hidden: bool,
    ) -> Result<Vec<FileMatch>, FinderError> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // The root itself is never filtered.
                entry.depth() == 0
                    || ((include_hidden || !is_hidden(entry))
                        && !(entry.file_type().is_dir()
                            && exclusions.is_excluded(entry.path(), root)))
            });

        let mut matches = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| FinderError::Walk {
                path: source.path().unwrap_or(root).to_path_buf(),
                source,
            })?;

            // Symlinked files count; symlinked directories are not descended.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            if exclusions.is_excluded(entry.path(), root) {
                tracing::trace!(path = %entry.path().display(), "excluded");
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some((format, role)) = self.registry.match_file(name) {
                tracing::debug!(path = %entry.path().display(), format = format.name(), ?role, "matched");
                matches.push(FileMatch {
                    path: entry.into_path(),
                    format: Arc::clone(format),
                    role,
                });
            }
        }

        Ok(matches)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
