use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::error::ExecError;

/// Builds the lock-file generating command for one ecosystem.
///
/// Implementations resolve the executable and assemble arguments; they never
/// start the process.
pub trait CmdFactory: Send + Sync {
    fn make_install_cmd(
        &self,
        executable: &str,
        manifest: &Path,
    ) -> Result<InstallCommand, ExecError>;
}

/// Executable lookup over a list of directories.
#[derive(Debug, Clone, Default)]
pub struct ExecPath {
    dirs: Vec<PathBuf>,
}

impl ExecPath {
    /// Search the directories of the `PATH` environment variable.
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Resolve `name` to an executable file. Names containing a path
    /// separator are checked as given.
    pub fn look_path(&self, name: &str) -> Result<PathBuf, ExecError> {
        let not_found = || ExecError::ExecutableNotFound {
            name: name.to_string(),
        };

        if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
            let path = PathBuf::from(name);
            return if is_executable(&path) {
                Ok(path)
            } else {
                Err(not_found())
            };
        }

        for dir in &self.dirs {
            for candidate in candidates(dir, name) {
                if is_executable(&candidate) {
                    return Ok(candidate);
                }
            }
        }
        Err(not_found())
    }
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let extensions = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    std::iter::once(dir.join(name))
        .chain(
            extensions
                .split(';')
                .filter(|ext| !ext.is_empty())
                .map(|ext| dir.join(format!("{}{}", name, ext.to_ascii_lowercase()))),
        )
        .collect()
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A fully resolved command that has not been started yet.
#[derive(Debug, Clone)]
pub struct InstallCommand {
    program: PathBuf,
    args: Vec<OsString>,
    dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl InstallCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn get_envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    /// Run to completion and return stdout followed by stderr.
    pub async fn output(&self) -> Result<String, ExecError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(program = %self.program.display(), args = ?self.args, "running install command");
        let output = cmd.output().await.map_err(|source| ExecError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(ExecError::Exit {
                program: self.program.clone(),
                code: output.status.code(),
                output: combined,
            })
        }
    }
}

/// Directory the install command runs in.
pub fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
