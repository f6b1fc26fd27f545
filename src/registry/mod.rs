//! The registry of supported manifest and lock file formats.
//!
//! Formats are fetched once from a [`FormatSource`], compiled into regular
//! expressions and then shared read-only (behind an `Arc`) by every
//! [`crate::finder::Finder`] in the process.

pub mod source;

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub use source::FormatSource;

/// A format as delivered by the format service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatDescriptor {
    /// Ecosystem identifier. Falls back to the first pattern when empty.
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "regex")]
    pub manifest_regex: Option<String>,
    #[serde(default, alias = "lockFileRegexes")]
    pub lock_regexes: Vec<String>,
}

/// What a matched file is to its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Manifest,
    Lock,
}

/// A format with its patterns compiled. Patterns are tested against file names.
#[derive(Debug)]
pub struct CompiledFormat {
    name: String,
    manifest: Option<Regex>,
    locks: Vec<Regex>,
}

impl CompiledFormat {
    pub fn compile(descriptor: &FormatDescriptor) -> Result<Self, RegistryError> {
        let name = if descriptor.name.is_empty() {
            descriptor
                .manifest_regex
                .clone()
                .or_else(|| descriptor.lock_regexes.first().cloned())
                .unwrap_or_default()
        } else {
            descriptor.name.clone()
        };

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
                format: name.clone(),
                pattern: pattern.to_string(),
                source,
            })
        };

        let manifest = descriptor
            .manifest_regex
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(compile)
            .transpose()?;
        let locks = descriptor
            .lock_regexes
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            manifest,
            locks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest(&self) -> Option<&Regex> {
        self.manifest.as_ref()
    }

    pub fn locks(&self) -> &[Regex] {
        &self.locks
    }

    /// The manifest pattern wins over the lock patterns.
    pub fn role_of(&self, file_name: &str) -> Option<FileRole> {
        if self.manifest.as_ref().is_some_and(|re| re.is_match(file_name)) {
            return Some(FileRole::Manifest);
        }
        if self.locks.iter().any(|re| re.is_match(file_name)) {
            return Some(FileRole::Lock);
        }
        None
    }

    fn is_empty(&self) -> bool {
        self.manifest.is_none() && self.locks.is_empty()
    }
}

impl fmt::Display for CompiledFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// All supported formats, in source order.
#[derive(Debug, Default)]
pub struct Registry {
    formats: Vec<Arc<CompiledFormat>>,
}

impl Registry {
    /// Fetch and compile the supported formats.
    pub async fn fetch(source: &FormatSource) -> Result<Self, RegistryError> {
        let descriptors = source.fetch().await?;
        let registry = Self::from_descriptors(&descriptors)?;
        tracing::debug!(formats = registry.len(), "compiled supported formats");
        Ok(registry)
    }

    pub fn from_descriptors(descriptors: &[FormatDescriptor]) -> Result<Self, RegistryError> {
        let mut formats = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let format = CompiledFormat::compile(descriptor)?;
            if format.is_empty() {
                tracing::debug!(format = %format.name, "skipping format without patterns");
                continue;
            }
            formats.push(Arc::new(format));
        }
        Ok(Self { formats })
    }

    pub fn formats(&self) -> &[Arc<CompiledFormat>] {
        &self.formats
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CompiledFormat>> {
        self.formats.iter().find(|f| f.name == name)
    }

    /// First format, in registry order, that claims `file_name`.
    pub fn match_file(&self, file_name: &str) -> Option<(&Arc<CompiledFormat>, FileRole)> {
        self.formats
            .iter()
            .find_map(|format| format.role_of(file_name).map(|role| (format, role)))
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
