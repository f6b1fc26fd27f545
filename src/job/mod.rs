//! Lock-file generation jobs.
//!
//! A [`Job`] is bound to one manifest and one [`PackageManager`]. Running it
//! builds the install command through a [`CmdFactory`], executes it and, on
//! failure, classifies the error with the package manager's pattern table.
//!
//! # Status updates
//!
//! Jobs report progress through a bounded queue created by
//! [`status_channel`]. The receiving half must be drained for as long as any
//! job is running; a job waits for queue capacity before continuing. Once the
//! receiver is dropped, updates are discarded.

pub mod classifier;
pub mod errors;
pub mod exec;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::ExecError;
use crate::pm::PackageManager;
use classifier::classify;
use errors::JobErrors;
use exec::CmdFactory;

/// A progress message from a running job.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub file: PathBuf,
    pub message: String,
}

pub type StatusReceiver = mpsc::Receiver<StatusUpdate>;

#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: mpsc::Sender<StatusUpdate>,
}

impl StatusSender {
    async fn send(&self, file: &Path, message: &str) {
        let update = StatusUpdate {
            file: file.to_path_buf(),
            message: message.to_string(),
        };
        if self.tx.send(update).await.is_err() {
            tracing::trace!(file = %file.display(), "status receiver gone");
        }
    }
}

/// Create a bounded status queue holding at most `capacity` pending updates.
pub fn status_channel(capacity: usize) -> (StatusSender, StatusReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (StatusSender { tx }, rx)
}

pub struct Job {
    file: PathBuf,
    install: bool,
    pm: &'static dyn PackageManager,
    cmd_factory: Box<dyn CmdFactory>,
    status: StatusSender,
    errors: JobErrors,
}

/// What a finished job leaves behind.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub file: PathBuf,
    pub package_manager: &'static str,
    pub errors: JobErrors,
}

impl Job {
    pub fn new(
        file: impl Into<PathBuf>,
        install: bool,
        pm: &'static dyn PackageManager,
        cmd_factory: Box<dyn CmdFactory>,
        status: StatusSender,
    ) -> Self {
        Self {
            file: file.into(),
            install,
            pm,
            cmd_factory,
            status,
            errors: JobErrors::default(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn install(&self) -> bool {
        self.install
    }

    pub fn errors(&self) -> &JobErrors {
        &self.errors
    }

    /// Generate the lock file. Consumes the job, so it runs at most once.
    ///
    /// Failures never escape: they are classified and recorded as critical
    /// errors on the returned report.
    pub async fn run(mut self) -> JobReport {
        if self.install {
            self.status
                .send(&self.file, self.pm.status_message())
                .await;

            match self.run_install_cmd().await {
                Ok(_) => {
                    tracing::info!(file = %self.file.display(), pm = self.pm.name(), "lock file generated");
                }
                Err(err) => {
                    let classified = classify(self.pm.error_patterns(), &err.to_string());
                    tracing::warn!(
                        file = %self.file.display(),
                        pm = self.pm.name(),
                        kind = %classified.kind,
                        "resolution failed"
                    );
                    self.errors.critical(classified);
                }
            }
        }

        JobReport {
            file: self.file,
            package_manager: self.pm.name(),
            errors: self.errors,
        }
    }

    async fn run_install_cmd(&self) -> Result<String, ExecError> {
        let cmd = self
            .cmd_factory
            .make_install_cmd(self.pm.executable(), &self.file)?;
        cmd.output().await
    }
}
