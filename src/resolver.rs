//! Runs lock-file generation for every group that needs it.
//!
//! The [`Resolver`] turns file groups into [`Job`]s, runs them concurrently
//! with a bounded worker count and collects one [`JobReport`] per job, sorted
//! by manifest path.

use std::path::Path;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

use crate::job::{status_channel, Job, JobReport, StatusReceiver};
use crate::models::{FileGroup, FileGroups};
use crate::pm::{self, PackageManager};

pub struct Resolver {
    concurrency: usize,
    regenerate: bool,
    progress: Option<ProgressBar>,
}

impl Resolver {
    pub fn new(concurrency: usize, regenerate: bool) -> Self {
        Self {
            concurrency: concurrency.max(1),
            regenerate,
            progress: None,
        }
    }

    /// Report finished jobs and status messages on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Manifests that will be handed to a package manager.
    pub fn pending<'a>(
        &self,
        groups: &'a FileGroups,
    ) -> Vec<(&'static dyn PackageManager, &'a Path)> {
        groups
            .iter()
            .filter_map(|group| needs_resolution(group, self.regenerate))
            .collect()
    }

    pub async fn resolve(&self, groups: &FileGroups) -> Vec<JobReport> {
        let (status, rx) = status_channel(self.concurrency * 2);
        let jobs: Vec<Job> = self
            .pending(groups)
            .into_iter()
            .map(|(pm, manifest)| pm::new_job(pm, manifest, true, status.clone()))
            .inspect(|job| {
                tracing::debug!(file = %job.file().display(), install = job.install(), "queued");
            })
            .collect();
        // The drain below ends once the last job drops its sender.
        drop(status);

        tracing::info!(jobs = jobs.len(), concurrency = self.concurrency, "resolving");
        self.run(jobs, rx).await
    }

    /// Run prepared jobs while draining `rx`.
    ///
    /// Every sender feeding `rx` must be owned by one of `jobs`, otherwise the
    /// drain never finishes.
    pub async fn run(&self, jobs: Vec<Job>, rx: StatusReceiver) -> Vec<JobReport> {
        if let Some(pb) = &self.progress {
            pb.set_length(jobs.len() as u64);
        }
        let drain = tokio::spawn(drain_status(rx, self.progress.clone()));

        let mut reports: Vec<JobReport> = stream::iter(jobs)
            .map(Job::run)
            .buffer_unordered(self.concurrency)
            .inspect(|report| {
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                    pb.set_message(report.file.display().to_string());
                }
            })
            .collect()
            .await;

        if let Err(err) = drain.await {
            tracing::warn!(error = %err, "status drain task failed");
        }
        if let Some(pb) = &self.progress {
            pb.finish_with_message("Done");
        }

        reports.sort_by(|a, b| a.file.cmp(&b.file));
        reports
    }
}

/// The package manager that should regenerate `group`'s lock file, if any.
///
/// The package manager is picked by format name, then by manifest file name.
/// Lock-only groups and manifests without a plug-in are never resolved. A
/// group that already has a lock file is resolved only with `regenerate`.
pub fn needs_resolution(
    group: &FileGroup,
    regenerate: bool,
) -> Option<(&'static dyn PackageManager, &Path)> {
    let manifest = group.file_path.as_deref()?;
    let pm = pm::lookup(group.format_name()).or_else(|| pm::for_manifest(manifest))?;
    (regenerate || group.related_files.is_empty()).then_some((pm, manifest))
}

async fn drain_status(mut rx: StatusReceiver, progress: Option<ProgressBar>) {
    while let Some(update) = rx.recv().await {
        tracing::info!(file = %update.file.display(), "{}", update.message);
        if let Some(pb) = &progress {
            pb.set_message(format!("{} ({})", update.file.display(), update.message));
        }
    }
}
