//! Error types for discovery and command execution.
//!
//! Discovery errors ([`RegistryError`], [`FinderError`]) abort a run and are
//! surfaced to the caller unchanged. [`ExecError`] is produced while a job
//! runs; the job classifies it into a [`crate::job::errors::JobError`] and
//! records it instead of returning it.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain or compile the supported formats.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The format service could not be reached.
    #[error("failed to fetch supported formats: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered `402 Payment Required`.
    #[error("failed to fetch supported formats: an active subscription is required for this feature")]
    SubscriptionRequired,

    /// Any other non-success status.
    #[error("failed to fetch supported formats: HTTP {status}")]
    Status { status: u16 },

    /// A local formats file could not be read.
    #[error("failed to read supported formats from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload was not a list of format descriptors.
    #[error("failed to decode supported formats: {0}")]
    Decode(#[from] serde_json::Error),

    /// A descriptor carried a pattern that is not a valid regular expression.
    #[error("invalid pattern `{pattern}` in format {format}: {source}")]
    InvalidPattern {
        format: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure while walking the scan root.
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Failure to build or execute an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The executable is not on the search path.
    #[error("exec: \"{name}\": executable file not found in $PATH")]
    ExecutableNotFound { name: String },

    /// The process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully; `output` holds stdout then stderr.
    #[error("{program} exited with {}\n{output}", exit_label(.code))]
    Exit {
        program: PathBuf,
        code: Option<i32>,
        output: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "a signal".to_string(),
    }
}
