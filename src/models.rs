use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use crate::registry::CompiledFormat;

/// Which incomplete groups survive grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strictness {
    /// Keep pairs, manifest-only and lock-only groups.
    #[default]
    All,
    /// Keep every group that has at least one lock file.
    LockAndPairs,
    /// Keep only manifests that have at least one lock file.
    Pairs,
}

impl Strictness {
    pub fn keeps(&self, group: &FileGroup) -> bool {
        match self {
            Strictness::All => true,
            Strictness::LockAndPairs => !group.related_files.is_empty(),
            Strictness::Pairs => group.has_file() && !group.related_files.is_empty(),
        }
    }
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strictness::All => write!(f, "all"),
            Strictness::LockAndPairs => write!(f, "lock-and-pairs"),
            Strictness::Pairs => write!(f, "pairs"),
        }
    }
}

/// A manifest and its lock files, or a set of lock files without a manifest.
#[derive(Debug, Clone, Serialize)]
pub struct FileGroup {
    #[serde(rename = "manifest")]
    pub file_path: Option<PathBuf>,
    #[serde(rename = "format", serialize_with = "format_name")]
    pub compiled_format: Arc<CompiledFormat>,
    #[serde(rename = "lock_files")]
    pub related_files: Vec<PathBuf>,
}

fn format_name<S: Serializer>(format: &Arc<CompiledFormat>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(format.name())
}

impl FileGroup {
    pub fn has_file(&self) -> bool {
        self.file_path.is_some()
    }

    /// The manifest first, then the lock files.
    pub fn all_files(&self) -> impl Iterator<Item = &Path> {
        self.file_path
            .as_deref()
            .into_iter()
            .chain(self.related_files.iter().map(PathBuf::as_path))
    }

    /// The path the group is ordered by.
    pub fn primary_path(&self) -> &Path {
        self.file_path
            .as_deref()
            .or_else(|| self.related_files.first().map(PathBuf::as_path))
            .unwrap_or_else(|| Path::new(""))
    }

    pub fn format_name(&self) -> &str {
        self.compiled_format.name()
    }
}

/// Sorted, deduplicated file groups.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FileGroups {
    groups: Vec<FileGroup>,
}

impl FileGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileGroup> {
        self.groups.iter()
    }

    pub fn as_slice(&self) -> &[FileGroup] {
        &self.groups
    }
}

impl From<Vec<FileGroup>> for FileGroups {
    fn from(mut groups: Vec<FileGroup>) -> Self {
        groups.sort_by(|a, b| {
            a.primary_path()
                .cmp(b.primary_path())
                .then_with(|| a.format_name().cmp(b.format_name()))
        });
        // Lock-only groups have no manifest, so identity falls back to the primary path.
        groups.dedup_by(|a, b| {
            a.primary_path() == b.primary_path() && a.format_name() == b.format_name()
        });
        FileGroups { groups }
    }
}

impl<'a> IntoIterator for &'a FileGroups {
    type Item = &'a FileGroup;
    type IntoIter = std::slice::Iter<'a, FileGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::sample_registry;

    fn group(manifest: Option<&str>, format: &str, locks: &[&str]) -> FileGroup {
        let registry = sample_registry();
        FileGroup {
            file_path: manifest.map(PathBuf::from),
            compiled_format: registry.get(format).unwrap().clone(),
            related_files: locks.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_all_files_lists_manifest_first() {
        let g = group(Some("a/Cargo.toml"), "cargo", &["a/Cargo.lock"]);
        let files: Vec<_> = g.all_files().collect();
        assert_eq!(files, vec![Path::new("a/Cargo.toml"), Path::new("a/Cargo.lock")]);
        assert!(g.has_file());
    }

    #[test]
    fn test_lock_only_group() {
        let g = group(None, "cargo", &["a/Cargo.lock"]);
        assert!(!g.has_file());
        assert_eq!(g.primary_path(), Path::new("a/Cargo.lock"));
        assert_eq!(g.all_files().count(), 1);
    }

    #[test]
    fn test_strictness_rules() {
        let pair = group(Some("a/composer.json"), "composer", &["a/composer.lock"]);
        let manifest_only = group(Some("b/go.mod"), "gomod", &[]);
        let lock_only = group(None, "cargo", &["c/Cargo.lock"]);

        assert!(Strictness::All.keeps(&pair));
        assert!(Strictness::All.keeps(&manifest_only));
        assert!(Strictness::All.keeps(&lock_only));

        assert!(Strictness::LockAndPairs.keeps(&pair));
        assert!(!Strictness::LockAndPairs.keeps(&manifest_only));
        assert!(Strictness::LockAndPairs.keeps(&lock_only));

        assert!(Strictness::Pairs.keeps(&pair));
        assert!(!Strictness::Pairs.keeps(&manifest_only));
        assert!(!Strictness::Pairs.keeps(&lock_only));
    }

    #[test]
    fn test_groups_are_sorted_and_deduplicated() {
        let groups = FileGroups::from(vec![
            group(Some("b/go.mod"), "gomod", &[]),
            group(Some("a/composer.json"), "composer", &["a/composer.lock"]),
            group(Some("b/go.mod"), "gomod", &[]),
            group(None, "cargo", &["a/Cargo.lock"]),
            group(None, "cargo", &["c/Cargo.lock"]),
        ]);
        let primaries: Vec<_> = groups.iter().map(|g| g.primary_path()).collect();
        assert_eq!(
            primaries,
            vec![
                Path::new("a/Cargo.lock"),
                Path::new("a/composer.json"),
                Path::new("b/go.mod"),
                Path::new("c/Cargo.lock"),
            ]
        );
    }

    #[test]
    fn test_group_serializes_format_name() {
        let g = group(Some("a/Cargo.toml"), "cargo", &["a/Cargo.lock"]);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["format"], "cargo");
        assert_eq!(json["manifest"], "a/Cargo.toml");
        assert_eq!(json["lock_files"][0], "a/Cargo.lock");
    }
}
