//! Batch orchestration: scan, rewrite each file, notify the hook.
//!
//! Files are processed one at a time in scan order. Per-file failures are
//! recorded in the [`RunSummary`] and never abort the batch; only a failure to
//! enumerate the root (or to query git) fails the whole run.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::{ErrorKind, Result};
use crate::git::changed_config_files;
use crate::hook::{HookOutcome, NoopHook, PostUpdateHook};
use crate::report::{Failure, RunSummary};
use crate::scanner::{scan, ScanOptions, CONFIG_FILE_NAME};
use crate::updater::{containing_dir, plan_update, update_file_to};
use crate::version::ApiVersion;

/// Which files a run considers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanScope {
    /// Every config file under the root.
    #[default]
    FullTree,
    /// Only config files changed relative to a git ref.
    ChangedSince(String),
}

/// Per-run settings.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub scope: ScanScope,
    pub scan: ScanOptions,
    /// Compute new contents without writing files or running the hook.
    pub dry_run: bool,
}

/// Drives one batch update.
pub struct Orchestrator<'a> {
    version: ApiVersion,
    hook: &'a dyn PostUpdateHook,
    options: RunOptions,
}

impl<'a> Orchestrator<'a> {
    /// The version is fixed for the whole run.
    pub fn new(version: ApiVersion, hook: &'a dyn PostUpdateHook) -> Self {
        Self {
            version,
            hook,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Update every config file under `root` and report the outcome.
    pub fn run(&self, root: &Path) -> Result<RunSummary> {
        let mut summary = RunSummary::new(root, self.version, self.options.dry_run);

        let files = self.collect(root, &mut summary)?;
        summary.found = files.len();
        info!(
            root = %root.display(),
            version = %self.version,
            found = files.len(),
            dry_run = self.options.dry_run,
            "Starting api_version sync"
        );

        if files.is_empty() {
            info!("No {} files found.", CONFIG_FILE_NAME);
        }

        for path in files {
            self.process(&path, &mut summary);
        }

        info!(
            updated = summary.updated_count(),
            failed = summary.failed_count(),
            "api_version sync finished"
        );
        Ok(summary)
    }

    fn collect(&self, root: &Path, summary: &mut RunSummary) -> Result<Vec<PathBuf>> {
        match &self.options.scope {
            ScanScope::FullTree => {
                let report = scan(root, &self.options.scan)?;
                for skipped in report.skipped {
                    summary.failures.push(Failure {
                        path: skipped.path,
                        kind: ErrorKind::Access,
                        message: skipped.reason,
                    });
                }
                Ok(report.files)
            }
            ScanScope::ChangedSince(base) => {
                let mut files = changed_config_files(root, base)?;
                files.retain(|path| {
                    let excluded = self.options.scan.excludes_path(root, path);
                    if excluded {
                        debug!(path = %path.display(), "Excluded changed config");
                    }
                    !excluded
                });
                Ok(files)
            }
        }
    }

    fn process(&self, path: &Path, summary: &mut RunSummary) {
        let result = if self.options.dry_run {
            plan_update(path, &self.version).map(|plan| plan.outcome)
        } else {
            update_file_to(path, &self.version)
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(path = %path.display(), kind = %e.kind(), error = %e, "Failed to update");
                summary.failures.push(Failure::from_error(path, &e));
                return;
            }
        };

        info!(
            path = %path.display(),
            previous = outcome.previous.as_deref().unwrap_or("<none>"),
            version = %self.version,
            "Updated {} with the latest API version",
            path.display()
        );
        summary.updated.push(outcome);

        if self.options.dry_run {
            return;
        }

        let dir = containing_dir(path);
        match self.hook.after_update(dir) {
            Ok(HookOutcome::Ran) => info!(dir = %dir.display(), "Post-update command succeeded"),
            Ok(HookOutcome::Skipped) => {}
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Post-update command failed");
                summary.failures.push(Failure::from_error(path, &e));
            }
        }
    }
}

/// Update everything under `root` to today's version without a hook.
pub fn run(root: &Path) -> Result<RunSummary> {
    Orchestrator::new(ApiVersion::current(), &NoopHook).run(root)
}
