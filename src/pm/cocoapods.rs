use std::path::Path;
use std::sync::LazyLock;

use crate::error::ExecError;
use crate::job::classifier::{capture, ErrorPattern};
use crate::job::errors::ErrorKind;
use crate::job::exec::{manifest_dir, CmdFactory, ExecPath, InstallCommand};

pub struct CocoaPods;

pub struct PodCmdFactory {
    exec_path: ExecPath,
}

impl PodCmdFactory {
    pub fn new(exec_path: ExecPath) -> Self {
        Self { exec_path }
    }
}

impl CmdFactory for PodCmdFactory {
    fn make_install_cmd(
        &self,
        executable: &str,
        manifest: &Path,
    ) -> Result<InstallCommand, ExecError> {
        let program = self.exec_path.look_path(executable)?;
        Ok(InstallCommand::new(program)
            .args(["install", "--no-repo-update"])
            .current_dir(manifest_dir(manifest)))
    }
}

static PATTERNS: LazyLock<Vec<ErrorPattern>> = LazyLock::new(|| {
    vec![
        ErrorPattern::executable_not_found("CocoaPods"),
        ErrorPattern::new(
            ErrorKind::InvalidDependencyReference,
            r"Unable to find a specification",
            |_| {
                "Failed to find pod specification. Try running 'pod repo update' to update your local specs repository, or check that the pod name and version are correct in your Podfile."
                    .to_string()
            },
        ),
        ErrorPattern::network(
            r"Failed to connect to|Connection refused|Network is unreachable",
            None,
        ),
        ErrorPattern::new(
            ErrorKind::InvalidDependencyReference,
            r"Unable to find a pod with name.*?`([^`]+)`",
            |caps| {
                format!(
                    "Couldn't find pod {}, please make sure it is spelt correctly and exists in the CocoaPods repository.",
                    capture(caps, 1)
                )
            },
        ),
        // Lazy so the first quoted requirement is reported, not `Podfile`.
        ErrorPattern::new(
            ErrorKind::VersionResolutionConflict,
            r"Unable to satisfy the following requirements.*?`([^`]+)`",
            |caps| {
                format!(
                    "Couldn't resolve version conflict for {}, please check your Podfile for conflicting version requirements.",
                    capture(caps, 1)
                )
            },
        ),
        ErrorPattern::new(
            ErrorKind::ToolchainIncompatible,
            r"requires a higher minimum deployment target",
            |_| {
                "One or more pods require a higher minimum deployment target. Please update the platform version in your Podfile or update the affected pods."
                    .to_string()
            },
        ),
    ]
});

impl super::PackageManager for CocoaPods {
    fn name(&self) -> &'static str {
        "cocoapods"
    }

    fn tool(&self) -> &'static str {
        "CocoaPods"
    }

    fn executable(&self) -> &'static str {
        "pod"
    }

    fn manifests(&self) -> &'static [&'static str] {
        &[r"^Podfile$"]
    }

    fn lock_file(&self) -> &'static str {
        "Podfile.lock"
    }

    fn status_message(&self) -> &'static str {
        "installing dependencies"
    }

    fn cmd_factory(&self) -> Box<dyn CmdFactory> {
        Box::new(PodCmdFactory::new(ExecPath::from_env()))
    }

    fn error_patterns(&self) -> &'static [ErrorPattern] {
        &PATTERNS
    }
}
