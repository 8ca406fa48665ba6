//! Per-entry status lines.

use colored::Colorize;
use std::path::Path;

/// Outcome of processing one walked entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Output directory mirrored.
    Created,
    /// Template rendered and written.
    Rendered,
    /// Plain file copied verbatim.
    Copied,
    /// Template failed to load or render; carries the engine message.
    Failed(String),
}

pub trait Reporter {
    fn report(&mut self, rel: &Path, status: &Status);
}

/// Coloured `> path` lines on stdout.
pub struct TermReporter;

impl Reporter for TermReporter {
    fn report(&mut self, rel: &Path, status: &Status) {
        let shown = display_rel(rel);
        let line = match status {
            Status::Created => format!("> {shown}").blue(),
            Status::Rendered => format!("> {shown}").green(),
            Status::Copied => format!("> {shown}").white(),
            Status::Failed(msg) => format!("> {shown}: {msg}").red(),
        };
        println!("{line}");
    }
}

/// The walk root has an empty relative path; show it as `.`.
fn display_rel(rel: &Path) -> String {
    if rel.as_os_str().is_empty() {
        ".".to_owned()
    } else {
        rel.display().to_string()
    }
}
