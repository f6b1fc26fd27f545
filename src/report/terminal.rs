use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::job::JobReport;
use crate::models::FileGroups;

/// Render a colored terminal report.
pub fn render(
    groups: &FileGroups,
    reports: &[JobReport],
    root: &Path,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let summary = Summary::new(groups, reports);

    if quiet {
        println!(
            "Groups: {}  Resolved: {}  Failed: {}",
            summary.groups,
            summary.resolved.to_string().green(),
            summary.failed.to_string().red(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "resolvr".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Scanning: {}\n", root.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("File groups        : {:>4}", summary.groups));
    println!(" │  {:<48} │", format!("  with lock files  : {:>4}", summary.paired));
    println!(" │  {:<48} │", format!("  manifest only    : {:>4}", summary.manifest_only));
    println!(" │  {:<48} │", format!("  lock files only  : {:>4}", summary.lock_only));
    println!(
        " │  {:<48} │",
        format!("{}  Resolved        : {:>4}", "✓".green(), summary.resolved)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Failed          : {:>4}", "✗".red(), summary.failed)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if !groups.is_empty() {
        println!(" {} Discovered files:\n", "[FILES]".cyan().bold());
        render_groups(groups, root);
        println!();
    }

    if summary.failed > 0 {
        println!(" {} Lock files that could not be generated:\n", "[ERROR]".red().bold());
        render_failures(reports, root, verbose);
        println!();
    }

    if verbose && summary.resolved > 0 {
        println!(" {} Generated lock files:\n", "[PASS]".green().bold());
        render_successes(reports, root);
        println!();
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    groups: usize,
    paired: usize,
    manifest_only: usize,
    lock_only: usize,
    resolved: usize,
    failed: usize,
}

impl Summary {
    fn new(groups: &FileGroups, reports: &[JobReport]) -> Self {
        let mut summary = Summary {
            groups: groups.len(),
            ..Default::default()
        };
        for group in groups {
            match (group.has_file(), group.related_files.is_empty()) {
                (true, false) => summary.paired += 1,
                (true, true) => summary.manifest_only += 1,
                (false, _) => summary.lock_only += 1,
            }
        }
        summary.failed = reports.iter().filter(|r| r.errors.has_error()).count();
        summary.resolved = reports.len() - summary.failed;
        summary
    }
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(names: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(names));
    table
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn render_groups(groups: &FileGroups, root: &Path) {
    let mut table = new_table(&["Format", "Manifest", "Lock files"]);

    for group in groups {
        let manifest = match &group.file_path {
            Some(path) => Cell::new(relative(path, root)),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        let locks = if group.related_files.is_empty() {
            Cell::new("missing").fg(Color::Yellow)
        } else {
            let names: Vec<String> = group
                .related_files
                .iter()
                .map(|lock| relative(lock, root))
                .collect();
            Cell::new(names.join("\n"))
        };
        table.add_row(vec![Cell::new(group.format_name()), manifest, locks]);
    }

    println!("{}", table);
}

fn render_failures(reports: &[JobReport], root: &Path, verbose: bool) {
    let mut table = new_table(&["Manifest", "Tool", "Error", "What to do"]);

    for report in reports.iter().filter(|r| r.errors.has_error()) {
        for err in report.errors.all() {
            table.add_row(vec![
                Cell::new(relative(&report.file, root)),
                Cell::new(report.package_manager),
                Cell::new(err.kind.to_string())
                    .fg(Color::Red)
                    .set_alignment(CellAlignment::Center),
                Cell::new(&err.documentation),
            ]);
        }
    }

    println!("{}", table);

    if verbose {
        for report in reports.iter().filter(|r| r.errors.has_error()) {
            for err in report.errors.all() {
                println!("\n {} {}", "→".cyan(), relative(&report.file, root));
                for line in err.message.lines() {
                    println!("   {}", line.dimmed());
                }
            }
        }
    }
}

fn render_successes(reports: &[JobReport], root: &Path) {
    let mut table = new_table(&["Manifest", "Tool", "Status"]);

    for report in reports.iter().filter(|r| !r.errors.has_error()) {
        table.add_row(vec![
            Cell::new(relative(&report.file, root)),
            Cell::new(report.package_manager),
            Cell::new("✓ resolved")
                .fg(Color::Green)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}
