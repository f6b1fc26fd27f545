use std::path::PathBuf;

use clap::Parser;

use crate::models::Strictness;

#[derive(Parser, Debug)]
#[command(
    name = "resolvr",
    about = "Find dependency manifests and generate their missing lock files",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Glob of paths to skip (repeatable, added to the configured defaults)
    #[arg(long, short = 'e', value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Which file groups to keep
    #[arg(long, value_name = "LEVEL")]
    pub strict: Option<StrictnessArg>,

    /// Discover files only, do not run any package manager
    #[arg(long)]
    pub no_install: bool,

    /// Regenerate lock files that already exist
    #[arg(long)]
    pub regenerate: bool,

    /// Descend into hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Read supported formats from a JSON file instead of the remote service
    #[arg(long, value_name = "FILE")]
    pub formats: Option<PathBuf>,

    /// Config file [default: ./.resolvr/config.toml, fallback ~/.config/resolvr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of package manager jobs run at once
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Show every group and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrictnessArg {
    #[value(alias = "0")]
    All,
    #[value(alias = "1")]
    LockAndPairs,
    #[value(alias = "2")]
    Pairs,
}

impl From<StrictnessArg> for Strictness {
    fn from(arg: StrictnessArg) -> Self {
        match arg {
            StrictnessArg::All => Strictness::All,
            StrictnessArg::LockAndPairs => Strictness::LockAndPairs,
            StrictnessArg::Pairs => Strictness::Pairs,
        }
    }
}
