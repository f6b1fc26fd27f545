use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::{FileGroup, FileGroups, Strictness};
use crate::registry::{CompiledFormat, FileRole};

/// A file that matched a format.
#[derive(Debug, Clone)]
pub struct FileMatch {
    pub path: PathBuf,
    pub format: Arc<CompiledFormat>,
    pub role: FileRole,
}

#[derive(Default)]
struct Bucket {
    format: Option<Arc<CompiledFormat>>,
    manifests: Vec<PathBuf>,
    locks: Vec<PathBuf>,
}

/// Partition matches into file groups and apply `strictness`.
///
/// Lock files pair with every manifest of the same format in the same
/// directory. Lock files without such a manifest form one lock-only group per
/// directory and format. The result does not depend on the order of `matches`.
pub fn group(mut matches: Vec<FileMatch>, strictness: Strictness) -> FileGroups {
    matches.sort_by(|a, b| a.path.cmp(&b.path));
    matches.dedup_by(|a, b| a.path == b.path);

    let mut buckets: BTreeMap<(PathBuf, String), Bucket> = BTreeMap::new();
    for m in matches {
        let dir = m.path.parent().map(Path::to_path_buf).unwrap_or_default();
        let bucket = buckets
            .entry((dir, m.format.name().to_string()))
            .or_default();
        match m.role {
            FileRole::Manifest => bucket.manifests.push(m.path),
            FileRole::Lock => bucket.locks.push(m.path),
        }
        bucket.format.get_or_insert(m.format);
    }

    let mut groups = Vec::new();
    for bucket in buckets.into_values() {
        let Some(format) = bucket.format else {
            continue;
        };

        if bucket.manifests.is_empty() {
            groups.push(FileGroup {
                file_path: None,
                compiled_format: format,
                related_files: bucket.locks,
            });
            continue;
        }

        for manifest in bucket.manifests {
            groups.push(FileGroup {
                file_path: Some(manifest),
                compiled_format: Arc::clone(&format),
                related_files: bucket.locks.clone(),
            });
        }
    }

    let total = groups.len();
    let kept: Vec<FileGroup> = groups.into_iter().filter(|g| strictness.keeps(g)).collect();
    tracing::debug!(total, kept = kept.len(), %strictness, "grouped matched files");

    FileGroups::from(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::sample_registry;
    use crate::registry::Registry;

    fn matches(registry: &Registry, paths: &[&str]) -> Vec<FileMatch> {
        paths
            .iter()
            .filter_map(|p| {
                let path = PathBuf::from(p);
                let name = path.file_name()?.to_str()?.to_string();
                let (format, role) = registry.match_file(&name)?;
                Some(FileMatch {
                    path,
                    format: format.clone(),
                    role,
                })
            })
            .collect()
    }

    const TREE: &[&str] = &[
        "root/composer/composer.json",
        "root/composer/composer.lock",
        "root/go/go.mod",
        "root/misc/requirements.txt",
        "root/misc/Cargo.lock",
        "root/yarn/yarn.lock",
    ];

    fn primaries(groups: &FileGroups) -> Vec<String> {
        groups
            .iter()
            .map(|g| g.primary_path().display().to_string())
            .collect()
    }

    #[test]
    fn test_strict_all_keeps_everything() {
        let registry = sample_registry();
        let groups = group(matches(&registry, TREE), Strictness::All);
        assert_eq!(
            primaries(&groups),
            vec![
                "root/composer/composer.json",
                "root/go/go.mod",
                "root/misc/Cargo.lock",
                "root/misc/requirements.txt",
                "root/yarn/yarn.lock",
            ]
        );
        let requirements = &groups.as_slice()[3];
        assert!(requirements.has_file());
        assert!(requirements.related_files.is_empty());
    }

    #[test]
    fn test_strict_lock_and_pairs_drops_manifest_only() {
        let registry = sample_registry();
        let groups = group(matches(&registry, TREE), Strictness::LockAndPairs);
        assert_eq!(groups.len(), 3);
        let cargo = &groups.as_slice()[1];
        assert!(!cargo.has_file());
        assert_eq!(cargo.related_files, vec![PathBuf::from("root/misc/Cargo.lock")]);
    }

    #[test]
    fn test_strict_pairs_keeps_only_pairs() {
        let registry = sample_registry();
        let groups = group(matches(&registry, TREE), Strictness::Pairs);
        assert_eq!(groups.len(), 1);
        let pair = &groups.as_slice()[0];
        assert_eq!(pair.file_path, Some(PathBuf::from("root/composer/composer.json")));
        assert_eq!(pair.related_files, vec![PathBuf::from("root/composer/composer.lock")]);
    }

    #[test]
    fn test_group_counts_shrink_with_strictness() {
        let registry = sample_registry();
        let all = group(matches(&registry, TREE), Strictness::All).len();
        let locks = group(matches(&registry, TREE), Strictness::LockAndPairs).len();
        let pairs = group(matches(&registry, TREE), Strictness::Pairs).len();
        assert!(all >= locks && locks >= pairs);
    }

    #[test]
    fn test_grouping_ignores_input_order() {
        let registry = sample_registry();
        let forward = group(matches(&registry, TREE), Strictness::All);
        let mut reversed_tree = TREE.to_vec();
        reversed_tree.reverse();
        let backward = group(matches(&registry, &reversed_tree), Strictness::All);
        assert_eq!(primaries(&forward), primaries(&backward));
    }

    #[test]
    fn test_lock_only_groups_in_different_directories_stay_apart() {
        let registry = sample_registry();
        let groups = group(
            matches(&registry, &["a/Cargo.lock", "b/Cargo.lock"]),
            Strictness::All,
        );
        assert_eq!(primaries(&groups), vec!["a/Cargo.lock", "b/Cargo.lock"]);
    }

    #[test]
    fn test_multiple_locks_attach_to_manifest() {
        let registry = sample_registry();
        let groups = group(
            matches(
                &registry,
                &["web/yarn.lock", "web/package.json", "web/package-lock.json"],
            ),
            Strictness::Pairs,
        );
        assert_eq!(groups.len(), 1);
        let g = &groups.as_slice()[0];
        assert_eq!(g.file_path, Some(PathBuf::from("web/package.json")));
        assert_eq!(
            g.related_files,
            vec![
                PathBuf::from("web/package-lock.json"),
                PathBuf::from("web/yarn.lock")
            ]
        );
    }

    #[test]
    fn test_lock_in_other_directory_does_not_pair() {
        let registry = sample_registry();
        let groups = group(
            matches(&registry, &["app/Cargo.toml", "app/sub/Cargo.lock"]),
            Strictness::All,
        );
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.has_file() == g.related_files.is_empty()));
    }

    #[test]
    fn test_duplicate_matches_collapse() {
        let registry = sample_registry();
        let groups = group(
            matches(&registry, &["x/Gemfile", "x/Gemfile", "x/Gemfile.lock"]),
            Strictness::All,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.as_slice()[0].related_files.len(), 1);
    }
}
