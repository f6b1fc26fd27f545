//! Report renderers for scan and resolution results.
//!
//! - [`terminal`] — colored summary, discovered file groups and failed jobs
//!   with their remediation text; respects `--verbose` / `--quiet`.
//! - [`ScanReport`] — the document printed by `--report json`.

pub mod terminal;

use std::path::Path;

use serde::Serialize;

use crate::job::JobReport;
use crate::models::FileGroups;

#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub root: &'a Path,
    pub groups: &'a FileGroups,
    pub jobs: &'a [JobReport],
}
