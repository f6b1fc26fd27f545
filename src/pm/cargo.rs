use std::path::Path;
use std::sync::LazyLock;

use crate::error::ExecError;
use crate::job::classifier::{capture, ErrorPattern};
use crate::job::errors::ErrorKind;
use crate::job::exec::{manifest_dir, CmdFactory, ExecPath, InstallCommand};

/// Rust packages, resolved with `cargo generate-lockfile`.
pub struct Cargo;

pub struct CargoCmdFactory {
    exec_path: ExecPath,
}

impl CargoCmdFactory {
    pub fn new(exec_path: ExecPath) -> Self {
        Self { exec_path }
    }
}

impl CmdFactory for CargoCmdFactory {
    fn make_install_cmd(
        &self,
        executable: &str,
        manifest: &Path,
    ) -> Result<InstallCommand, ExecError> {
        let program = self.exec_path.look_path(executable)?;
        Ok(InstallCommand::new(program)
            .arg("generate-lockfile")
            .current_dir(manifest_dir(manifest)))
    }
}

static PATTERNS: LazyLock<Vec<ErrorPattern>> = LazyLock::new(|| {
    vec![
        ErrorPattern::executable_not_found("Cargo"),
        ErrorPattern::network(
            r"failed to download|failed to fetch|Unable to update registry",
            Some("run 'cargo fetch' to populate the local cache before running the CLI."),
        ),
        ErrorPattern::new(
            ErrorKind::InvalidDependencyReference,
            r"no matching package named `([^`]+)`",
            |caps| {
                format!(
                    "Couldn't find crate {}, please make sure it is spelt correctly and exists in the crates.io registry.",
                    capture(caps, 1)
                )
            },
        ),
        ErrorPattern::new(
            ErrorKind::VersionResolutionConflict,
            r"failed to select a version for the requirement `([^`]+)`",
            |caps| {
                format!(
                    "Couldn't resolve version requirement for {}, please check your Cargo.toml for conflicting version requirements.",
                    capture(caps, 1)
                )
            },
        ),
        ErrorPattern::new(
            ErrorKind::ToolchainIncompatible,
            r"requires rustc ([^ ]+) or newer",
            |caps| {
                format!(
                    "This project requires Rust version {} or newer. Please update your Rust installation with 'rustup update'.",
                    capture(caps, 1)
                )
            },
        ),
        ErrorPattern::new(
            ErrorKind::ManifestParseError,
            r"could not parse input as TOML",
            |_| {
                "Failed to parse Cargo.toml. Please check that your Cargo.toml file is valid TOML syntax."
                    .to_string()
            },
        ),
    ]
});

impl super::PackageManager for Cargo {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn tool(&self) -> &'static str {
        "Cargo"
    }

    fn executable(&self) -> &'static str {
        "cargo"
    }

    fn manifests(&self) -> &'static [&'static str] {
        &[r"^Cargo\.toml$"]
    }

    fn lock_file(&self) -> &'static str {
        "Cargo.lock"
    }

    fn status_message(&self) -> &'static str {
        "generating lockfile"
    }

    fn cmd_factory(&self) -> Box<dyn CmdFactory> {
        Box::new(CargoCmdFactory::new(ExecPath::from_env()))
    }

    fn error_patterns(&self) -> &'static [ErrorPattern] {
        &PATTERNS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::classifier::classify;
    use crate::job::errors::UNKNOWN_ERROR_DOCUMENTATION;
    use crate::pm::PackageManager;

    #[cfg(unix)]
    #[test]
    fn test_make_install_cmd() {
        let dir = tempfile::tempdir().unwrap();
        let exe = crate::job::exec::testing::fake_executable(dir.path(), "cargo");
        let factory = CargoCmdFactory::new(ExecPath::new(vec![dir.path().to_path_buf()]));

        let cmd = factory
            .make_install_cmd("cargo", Path::new("crates/app/Cargo.toml"))
            .unwrap();

        assert_eq!(cmd.program(), exe);
        assert_eq!(cmd.get_args(), ["generate-lockfile"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("crates/app")));
    }

    #[test]
    fn test_make_install_cmd_without_cargo() {
        let factory = CargoCmdFactory::new(ExecPath::new(vec![]));
        let err = factory
            .make_install_cmd("cargo", Path::new("Cargo.toml"))
            .unwrap_err();
        assert!(matches!(err, ExecError::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_classify_errors() {
        let network_doc = "We weren't able to retrieve one or more dependencies. Please check your Internet connection and try again, or run 'cargo fetch' to populate the local cache before running the CLI.";
        let cases = [
            ("cmd-error", ErrorKind::UnknownToolError, UNKNOWN_ERROR_DOCUMENTATION.to_string()),
            (
                "        |exec: \"cargo\": executable file not found in $PATH",
                ErrorKind::ExecutableNotFound,
                "Cargo wasn't found. Please check if it is installed and accessible by the CLI.".to_string(),
            ),
            (
                "error: failed to download `serde v1.0.152`\n\nCaused by:\n  unable to get packages from source",
                ErrorKind::NetworkUnreachable,
                network_doc.to_string(),
            ),
            (
                "error: Unable to update registry `crates-io`\n\nCaused by:\n  failed to fetch `https://github.com/rust-lang/crates.io-index`",
                ErrorKind::NetworkUnreachable,
                network_doc.to_string(),
            ),
            (
                "error: no matching package named `nonexistent-crate` found\nlocation searched: registry `crates-io`",
                ErrorKind::InvalidDependencyReference,
                "Couldn't find crate nonexistent-crate, please make sure it is spelt correctly and exists in the crates.io registry.".to_string(),
            ),
            (
                "error: failed to select a version for the requirement `serde = \"^1.0\"`\ncandidate versions found which didn't match: 0.9.15, 0.9.14",
                ErrorKind::VersionResolutionConflict,
                "Couldn't resolve version requirement for serde = \"^1.0\", please check your Cargo.toml for conflicting version requirements.".to_string(),
            ),
            (
                "error: package `tokio v1.25.0` cannot be built because it requires rustc 1.56 or newer, while the currently active rustc version is 1.55.0",
                ErrorKind::ToolchainIncompatible,
                "This project requires Rust version 1.56 or newer. Please update your Rust installation with 'rustup update'.".to_string(),
            ),
            (
                "error: could not parse input as TOML\n\nCaused by:\n  TOML parse error at line 5, column 1",
                ErrorKind::ManifestParseError,
                "Failed to parse Cargo.toml. Please check that your Cargo.toml file is valid TOML syntax.".to_string(),
            ),
        ];

        for (message, kind, doc) in cases {
            let err = classify(Cargo.error_patterns(), message);
            assert_eq!(err.kind, kind, "{message}");
            assert_eq!(err.documentation, doc, "{message}");
            assert_eq!(err.message, message);
        }
    }

    #[test]
    fn test_network_error_wins_over_later_patterns() {
        let message = "failed to fetch index\nerror: could not parse input as TOML";
        let err = classify(Cargo.error_patterns(), message);
        assert_eq!(err.kind, ErrorKind::NetworkUnreachable);
    }
}
