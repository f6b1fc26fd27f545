use serde::Serialize;
use thiserror::Error;

/// Documentation attached to errors no pattern recognised.
pub const UNKNOWN_ERROR_DOCUMENTATION: &str =
    "An unknown error occurred. Run with --verbose and check the tool output above for details.";

/// Failure categories a tool error is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ExecutableNotFound,
    NetworkUnreachable,
    InvalidDependencyReference,
    VersionResolutionConflict,
    ToolchainIncompatible,
    ManifestParseError,
    UnknownToolError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ExecutableNotFound => write!(f, "executable not found"),
            ErrorKind::NetworkUnreachable => write!(f, "network unreachable"),
            ErrorKind::InvalidDependencyReference => write!(f, "invalid dependency"),
            ErrorKind::VersionResolutionConflict => write!(f, "version conflict"),
            ErrorKind::ToolchainIncompatible => write!(f, "incompatible toolchain"),
            ErrorKind::ManifestParseError => write!(f, "manifest parse error"),
            ErrorKind::UnknownToolError => write!(f, "unknown error"),
        }
    }
}

/// A classified job failure: the raw tool message plus remediation text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct JobError {
    pub kind: ErrorKind,
    pub message: String,
    pub documentation: String,
}

impl JobError {
    /// An unclassified error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UnknownToolError,
            message: message.into(),
            documentation: UNKNOWN_ERROR_DOCUMENTATION.to_string(),
        }
    }
}

/// Errors recorded by one job, in the order they happened.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct JobErrors {
    critical: Vec<JobError>,
}

impl JobErrors {
    pub fn critical(&mut self, err: JobError) {
        self.critical.push(err);
    }

    pub fn has_error(&self) -> bool {
        !self.critical.is_empty()
    }

    pub fn all(&self) -> &[JobError] {
        &self.critical
    }
}
