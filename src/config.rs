use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::Strictness;
use crate::registry::FormatSource;

/// Public endpoint listing the supported manifest and lock file formats.
pub const DEFAULT_FORMATS_URL: &str = "https://debricked.com/api/1.0/open/files/supported-formats";

/// Environment variable holding the registry access token.
pub const TOKEN_ENV: &str = "RESOLVR_TOKEN";

/// Directories that are never worth scanning.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "**/node_modules/**",
    "**/vendor/**",
    "**/.git/**",
    "**/obj/**",
    "**/bower_components/**",
];

/// Root configuration structure, deserialized from `.resolvr/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry: RegistryConfig,
    pub scan: ScanConfig,
    pub resolution: ResolutionConfig,
}

/// Where supported formats come from.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Offline source; takes precedence over `url`.
    pub formats_file: Option<PathBuf>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FORMATS_URL.to_string(),
            token: None,
            timeout_secs: 10,
            formats_file: None,
        }
    }
}

impl RegistryConfig {
    pub fn source(&self) -> FormatSource {
        match &self.formats_file {
            Some(path) => FormatSource::File(path.clone()),
            None => FormatSource::Remote {
                url: self.url.clone(),
                token: self.token.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub exclude: Vec<String>,
    pub strictness: Strictness,
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            strictness: Strictness::default(),
            include_hidden: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Package manager jobs run at once.
    pub jobs: usize,
    pub regenerate: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            regenerate: false,
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.resolvr/config.toml`
/// 3. `~/.config/resolvr/config.toml`
/// 4. Built-in [`Config::default`]
///
/// A `RESOLVR_TOKEN` environment variable replaces any configured token.
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    let home_config = dirs::home_dir().map(|home| home.join(".config").join("resolvr").join("config.toml"));
    let mut config = load_from(project_path, config_override, home_config.as_deref())?;

    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            config.registry.token = Some(token);
        }
    }
    Ok(config)
}

fn load_from(
    project_path: &Path,
    config_override: Option<&Path>,
    home_config: Option<&Path>,
) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".resolvr").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home_config) = home_config {
        if home_config.exists() {
            return read_config(home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
