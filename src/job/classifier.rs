//! Ordered pattern tables that turn raw tool output into documented errors.
//!
//! Every package manager exposes a table of [`ErrorPattern`]s. [`classify`]
//! walks the table in order and the first pattern whose regex matches decides
//! the [`ErrorKind`] and builds the remediation text from the captures. Later
//! patterns are never tried.

use regex::{Captures, Regex};

use super::errors::{ErrorKind, JobError};

type DocumentBuilder = Box<dyn Fn(&Captures<'_>) -> String + Send + Sync>;

/// One row of a classification table.
pub struct ErrorPattern {
    pub kind: ErrorKind,
    pub regex: Regex,
    document: DocumentBuilder,
}

impl ErrorPattern {
    /// Panics on an invalid regex; tables are static and covered by tests.
    pub fn new(
        kind: ErrorKind,
        pattern: &str,
        document: impl Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("invalid built-in error pattern"),
            document: Box::new(document),
        }
    }

    /// The tool could not be found on the search path.
    pub fn executable_not_found(tool: &'static str) -> Self {
        Self::new(
            ErrorKind::ExecutableNotFound,
            r"executable file not found",
            move |_| executable_not_found_documentation(tool),
        )
    }

    /// Connectivity failure, with optional extra advice.
    pub fn network(pattern: &str, advice: Option<&'static str>) -> Self {
        Self::new(ErrorKind::NetworkUnreachable, pattern, move |_| {
            network_documentation(advice)
        })
    }

    pub fn document(&self, caps: &Captures<'_>) -> String {
        (self.document)(caps)
    }
}

impl std::fmt::Debug for ErrorPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPattern")
            .field("kind", &self.kind)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// Classify `message` against `patterns`. First match wins.
pub fn classify(patterns: &[ErrorPattern], message: &str) -> JobError {
    let mut err = JobError::new(message);
    for pattern in patterns {
        if let Some(caps) = pattern.regex.captures(message) {
            err.kind = pattern.kind;
            err.documentation = pattern.document(&caps);
            return err;
        }
    }
    err
}

/// Capture group `index`, or an empty string.
pub fn capture<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}

pub fn executable_not_found_documentation(tool: &str) -> String {
    format!(
        "{} wasn't found. Please check if it is installed and accessible by the CLI.",
        tool
    )
}

pub fn network_documentation(advice: Option<&str>) -> String {
    let mut doc = String::from(
        "We weren't able to retrieve one or more dependencies. Please check your Internet connection and try again",
    );
    match advice {
        Some(advice) => {
            doc.push_str(", or ");
            doc.push_str(advice);
        }
        None => doc.push('.'),
    }
    doc
}
