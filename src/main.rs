//! `resolvr` — find dependency manifests and generate their missing lock files.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]) and apply CLI overrides.
//! 3. Fetch the supported formats ([`registry::Registry::fetch`]).
//! 4. Walk the project and group manifests with their lock files ([`finder`]).
//! 5. Run the package manager of every group that needs a lock file ([`resolver`]).
//! 6. Render the requested report ([`report`]).
//! 7. Exit `0` (clean) or `1` (nothing found, or at least one job failed).

mod cli;
mod config;
mod error;
mod finder;
mod job;
mod models;
mod pm;
mod registry;
mod report;
mod resolver;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::load_config;
use finder::Finder;
use models::Strictness;
use registry::Registry;
use report::ScanReport;
use resolver::Resolver;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Canonical path for config lookup and the JSON root; the walk uses the path as given
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let mut config = load_config(&path, cli.config.as_deref())?;
    config.scan.exclude.extend(cli.exclude.iter().cloned());
    if let Some(formats) = &cli.formats {
        config.registry.formats_file = Some(formats.clone());
    }
    let strictness = cli.strict.map(Strictness::from).unwrap_or(config.scan.strictness);
    let include_hidden = cli.include_hidden || config.scan.include_hidden;
    let regenerate = cli.regenerate || config.resolution.regenerate;
    let jobs = cli.jobs.unwrap_or(config.resolution.jobs);

    let registry = Arc::new(Registry::fetch(&config.registry.source()).await?);
    if registry.is_empty() {
        anyhow::bail!("the format source did not list any usable formats");
    }

    let finder = Finder::new(registry);
    tracing::debug!(formats = finder.formats().len(), "registry ready");
    let groups = finder.get_groups(&cli.path, &config.scan.exclude, include_hidden, strictness)?;

    if groups.is_empty() {
        eprintln!(
            "No supported manifest or lock files found in {}",
            path.display()
        );
        std::process::exit(1);
    }

    if !cli.quiet && matches!(cli.report, ReportFormat::Terminal) {
        eprintln!(
            "  {} {} file groups ({})",
            "→".cyan(),
            groups.len(),
            strictness
        );
    }

    let reports = if cli.no_install {
        Vec::new()
    } else {
        let mut resolver = Resolver::new(jobs, regenerate);
        let pending = resolver.pending(&groups).len();
        if pending > 0 && !cli.quiet && matches!(cli.report, ReportFormat::Terminal) {
            resolver = resolver.with_progress(progress_bar(pending)?);
        }
        resolver.resolve(&groups).await
    };

    // Render report
    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&groups, &reports, &cli.path, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            let scan = ScanReport {
                root: &path,
                groups: &groups,
                jobs: &reports,
            };
            println!("{}", serde_json::to_string_pretty(&scan)?);
        }
    }

    // Exit code: 1 if any job recorded a critical error
    if reports.iter().any(|r| r.errors.has_error()) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("resolvr=debug")
        } else {
            EnvFilter::new("resolvr=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
