//! Run summaries for CI consumers.
//!
//! A [`RunSummary`] is serializable for machine consumption and renders to
//! Markdown for a job step summary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ApiverError, ErrorKind};
use crate::updater::UpdateOutcome;
use crate::version::ApiVersion;

/// One thing that went wrong during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn from_error(path: &Path, err: &ApiverError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Aggregate result of an orchestrated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub root: PathBuf,
    pub version: ApiVersion,
    pub dry_run: bool,
    /// Config files considered.
    pub found: usize,
    pub updated: Vec<UpdateOutcome>,
    pub failures: Vec<Failure>,
}

impl RunSummary {
    pub fn new(root: &Path, version: ApiVersion, dry_run: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            version,
            dry_run,
            found: 0,
            updated: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    /// Files whose value actually moved.
    pub fn changed_count(&self) -> usize {
        self.updated.iter().filter(|u| u.changed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures_of(&self, kind: ErrorKind) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One line for terminal output.
    pub fn render_line(&self) -> String {
        format!(
            "{}api_version {}: {} found, {} updated ({} changed), {} failed",
            if self.dry_run { "[dry run] " } else { "" },
            self.version,
            self.found,
            self.updated_count(),
            self.changed_count(),
            self.failed_count()
        )
    }

    /// Markdown report suitable for `$GITHUB_STEP_SUMMARY`.
    pub fn render_markdown(&self) -> String {
        let mut md = format!("# api_version sync: {}\n\n", self.version);
        if self.dry_run {
            md.push_str("_Dry run: no files were written._\n\n");
        }
        let _ = writeln!(
            md,
            "| Found | Updated | Changed | Failed |\n|---|---|---|---|\n| {} | {} | {} | {} |",
            self.found,
            self.updated_count(),
            self.changed_count(),
            self.failed_count()
        );

        if !self.updated.is_empty() {
            md.push_str("\n## Updated\n\n| File | Previous | New |\n|---|---|---|\n");
            for u in &self.updated {
                let _ = writeln!(
                    md,
                    "| `{}` | {} | {} |",
                    u.path.display(),
                    u.previous.as_deref().unwrap_or("_(none)_"),
                    u.version
                );
            }
        }

        if !self.failures.is_empty() {
            md.push_str("\n## Failures\n\n");
            for f in &self.failures {
                let _ = writeln!(md, "- `{}` ({}): {}", f.path.display(), f.kind, f.message);
            }
        }
        md
    }
}
