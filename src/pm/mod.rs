use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::job::classifier::ErrorPattern;
use crate::job::exec::CmdFactory;
use crate::job::{Job, StatusSender};

pub mod cargo;
pub mod cocoapods;
pub mod rubygems;

/// One ecosystem's lock-file generation capabilities.
pub trait PackageManager: Send + Sync {
    /// Registry key, e.g. `cargo`.
    fn name(&self) -> &'static str;

    /// Human name used in error documentation, e.g. `Cargo`.
    fn tool(&self) -> &'static str;

    /// Executable looked up on the search path.
    fn executable(&self) -> &'static str;

    /// Manifest file name patterns handled by this package manager.
    fn manifests(&self) -> &'static [&'static str];

    /// Lock file written next to the manifest on success.
    fn lock_file(&self) -> &'static str;

    fn status_message(&self) -> &'static str;

    fn cmd_factory(&self) -> Box<dyn CmdFactory>;

    /// Ordered classification table; the first matching row wins.
    fn error_patterns(&self) -> &'static [ErrorPattern];
}

static PACKAGE_MANAGERS: &[&dyn PackageManager] =
    &[&cargo::Cargo, &rubygems::RubyGems, &cocoapods::CocoaPods];

static MANIFEST_MATCHERS: LazyLock<Vec<(Regex, &'static dyn PackageManager)>> =
    LazyLock::new(|| {
        all()
            .iter()
            .flat_map(|pm| {
                pm.manifests().iter().map(move |pattern| {
                    let regex = Regex::new(pattern).expect("invalid built-in manifest pattern");
                    (regex, *pm)
                })
            })
            .collect()
    });

/// Every supported package manager, in priority order.
pub fn all() -> &'static [&'static dyn PackageManager] {
    PACKAGE_MANAGERS
}

pub fn lookup(name: &str) -> Option<&'static dyn PackageManager> {
    PACKAGE_MANAGERS.iter().copied().find(|pm| pm.name() == name)
}

/// The package manager responsible for `manifest`, judged by its file name.
pub fn for_manifest(manifest: &Path) -> Option<&'static dyn PackageManager> {
    let name = manifest.file_name()?.to_str()?;
    MANIFEST_MATCHERS
        .iter()
        .find(|(regex, _)| regex.is_match(name))
        .map(|(_, pm)| *pm)
}

/// Build a job for `manifest` using the package manager's own command factory.
pub fn new_job(
    pm: &'static dyn PackageManager,
    manifest: &Path,
    install: bool,
    status: StatusSender,
) -> Job {
    Job::new(manifest, install, pm, pm.cmd_factory(), status)
}
