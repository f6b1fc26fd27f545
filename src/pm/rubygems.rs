use std::path::Path;
use std::sync::LazyLock;

use crate::error::ExecError;
use crate::job::classifier::{capture, ErrorPattern};
use crate::job::errors::ErrorKind;
use crate::job::exec::{manifest_dir, CmdFactory, ExecPath, InstallCommand};

/// Ruby gems, resolved with Bundler.
pub struct RubyGems;

pub struct BundlerCmdFactory {
    exec_path: ExecPath,
}

impl BundlerCmdFactory {
    pub fn new(exec_path: ExecPath) -> Self {
        Self { exec_path }
    }
}

impl CmdFactory for BundlerCmdFactory {
    fn make_install_cmd(
        &self,
        executable: &str,
        manifest: &Path,
    ) -> Result<InstallCommand, ExecError> {
        let program = self.exec_path.look_path(executable)?;
        // Bundler finds the Gemfile through BUNDLE_GEMFILE, so it must not be
        // relative to the working directory.
        let gemfile = std::path::absolute(manifest).unwrap_or_else(|_| manifest.to_path_buf());
        Ok(InstallCommand::new(program)
            .args(["install", "--quiet"])
            .current_dir(manifest_dir(manifest))
            .env("BUNDLE_GEMFILE", gemfile))
    }
}

static PATTERNS: LazyLock<Vec<ErrorPattern>> = LazyLock::new(|| {
    vec![
        ErrorPattern::executable_not_found("Bundler"),
        ErrorPattern::new(
            ErrorKind::InvalidDependencyReference,
            r"Could not find gem '([^']+)'",
            |caps| {
                format!(
                    "Couldn't find gem {}, please make sure it is spelt correctly and exists in the RubyGems repository.",
                    capture(caps, 1)
                )
            },
        ),
        ErrorPattern::new(
            ErrorKind::VersionResolutionConflict,
            r#"Bundler could not find compatible versions for gem "([^"]+)""#,
            |caps| {
                format!(
                    "Couldn't resolve version conflict for gem {}, please check your Gemfile for conflicting version requirements.",
                    capture(caps, 1)
                )
            },
        ),
        ErrorPattern::network(
            r"Could not reach rubygems repository|Network is unreachable|Failed to connect",
            None,
        ),
        ErrorPattern::new(
            ErrorKind::ToolchainIncompatible,
            r"requires Ruby version ([^\n]+)",
            |caps| {
                format!(
                    "This project requires a Ruby version satisfying {}. Please update your Ruby installation.",
                    capture(caps, 1).trim_end()
                )
            },
        ),
        ErrorPattern::new(
            ErrorKind::ManifestParseError,
            r"There was an error parsing|syntax error",
            |_| "Failed to parse Gemfile. Please check that your Gemfile has valid Ruby syntax.".to_string(),
        ),
    ]
});

impl super::PackageManager for RubyGems {
    fn name(&self) -> &'static str {
        "rubygems"
    }

    fn tool(&self) -> &'static str {
        "Bundler"
    }

    fn executable(&self) -> &'static str {
        "bundle"
    }

    fn manifests(&self) -> &'static [&'static str] {
        &[r"^Gemfile$"]
    }

    fn lock_file(&self) -> &'static str {
        "Gemfile.lock"
    }

    fn status_message(&self) -> &'static str {
        "installing dependencies"
    }

    fn cmd_factory(&self) -> Box<dyn CmdFactory> {
        Box::new(BundlerCmdFactory::new(ExecPath::from_env()))
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
        let exe = crate::job::exec::testing::fake_executable(dir.path(), "bundle");
        let factory = BundlerCmdFactory::new(ExecPath::new(vec![dir.path().to_path_buf()]));
        let manifest = dir.path().join("app").join("Gemfile");

        let cmd = factory.make_install_cmd("bundle", &manifest).unwrap();

        assert_eq!(cmd.program(), exe);
        assert_eq!(cmd.get_args(), ["install", "--quiet"]);
        assert_eq!(cmd.get_current_dir(), Some(dir.path().join("app").as_path()));
        let envs = cmd.get_envs();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].0, "BUNDLE_GEMFILE");
        assert_eq!(envs[0].1.as_os_str(), manifest.as_os_str());
    }

    #[test]
    fn test_make_install_cmd_without_bundler() {
        let factory = BundlerCmdFactory::new(ExecPath::new(vec![]));
        let err = factory
            .make_install_cmd("bundle", Path::new("Gemfile"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "exec: \"bundle\": executable file not found in $PATH"
        );
    }

    #[test]
    fn test_classify_errors() {
        let cases = [
            ("cmd-error", ErrorKind::UnknownToolError, UNKNOWN_ERROR_DOCUMENTATION.to_string()),
            (
                "        |exec: \"bundle\": executable file not found in $PATH",
                ErrorKind::ExecutableNotFound,
                "Bundler wasn't found. Please check if it is installed and accessible by the CLI.".to_string(),
            ),
            (
                "Could not find gem 'nonexistent-gem (>= 0)' in rubygems repository https://rubygems.org/ or installed locally.",
                ErrorKind::InvalidDependencyReference,
                "Couldn't find gem nonexistent-gem (>= 0), please make sure it is spelt correctly and exists in the RubyGems repository.".to_string(),
            ),
            (
                "Bundler could not find compatible versions for gem \"rails\":\n  In Gemfile:\n    rails (~> 6.0)\n\n    rails (= 5.2.3)",
                ErrorKind::VersionResolutionConflict,
                "Couldn't resolve version conflict for gem rails, please check your Gemfile for conflicting version requirements.".to_string(),
            ),
            (
                "Retrying fetcher due to error (2/4): Bundler::HTTPError Network is unreachable",
                ErrorKind::NetworkUnreachable,
                "We weren't able to retrieve one or more dependencies. Please check your Internet connection and try again.".to_string(),
            ),
            (
                "Your Ruby version is 2.6.0, but your Gemfile specified ~> 2.7.0\nruby_dep-1.5.0 requires Ruby version >= 2.2.5, ~> 2.2",
                ErrorKind::ToolchainIncompatible,
                "This project requires a Ruby version satisfying >= 2.2.5, ~> 2.2. Please update your Ruby installation.".to_string(),
            ),
            (
                "There was an error parsing `Gemfile`: syntax error, unexpected end-of-input, expecting keyword_end. Bundler cannot continue.",
                ErrorKind::ManifestParseError,
                "Failed to parse Gemfile. Please check that your Gemfile has valid Ruby syntax.".to_string(),
            ),
        ];

        for (message, kind, doc) in cases {
            let err = classify(RubyGems.error_patterns(), message);
            assert_eq!(err.kind, kind, "{message}");
            assert_eq!(err.documentation, doc, "{message}");
        }
    }

    #[test]
    fn test_missing_gem_is_reported_before_network_noise() {
        let message = "Could not find gem 'rack' in locally installed gems.\nFailed to connect to rubygems.org";
        let err = classify(RubyGems.error_patterns(), message);
        assert_eq!(err.kind, ErrorKind::InvalidDependencyReference);
    }
}
