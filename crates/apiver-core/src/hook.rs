//! Post-update hooks run once per rewritten extension directory.
//!
//! The orchestrator never inspects the environment; the caller decides which
//! hook to install (see [`hook_for_credential`]).

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{ApiverError, Result};

/// What a hook did for one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The hook chose not to act.
    Skipped,
    /// A command ran to completion with exit code 0.
    Ran,
}

/// Capability invoked after a config file was rewritten.
pub trait PostUpdateHook {
    /// Notify the hook that the config in `dir` was updated.
    ///
    /// Blocking. Errors are reported, never escalated past the current file.
    fn after_update(&self, dir: &Path) -> Result<HookOutcome>;
}

/// Hook that never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl PostUpdateHook for NoopHook {
    fn after_update(&self, _dir: &Path) -> Result<HookOutcome> {
        Ok(HookOutcome::Skipped)
    }
}

/// Runs `shopify app function schema --path <dir> [--config <name>]`.
///
/// Standard streams are inherited so CLI output shows up in the job log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCommandHook {
    /// Executable followed by its leading arguments.
    command: Vec<String>,
    config: Option<String>,
}

impl SchemaCommandHook {
    pub fn new(config: Option<String>) -> Self {
        Self::with_command(
            vec![
                "shopify".to_string(),
                "app".to_string(),
                "function".to_string(),
                "schema".to_string(),
            ],
            config,
        )
    }

    /// Use a different executable and leading arguments.
    pub fn with_command(command: Vec<String>, config: Option<String>) -> Self {
        Self { command, config }
    }

    /// Full argument vector for `dir`, executable first.
    pub fn argv(&self, dir: &Path) -> Vec<String> {
        let mut argv = self.command.clone();
        argv.push("--path".to_string());
        argv.push(dir.to_string_lossy().into_owned());
        if let Some(config) = &self.config {
            argv.push("--config".to_string());
            argv.push(config.clone());
        }
        argv
    }
}

impl PostUpdateHook for SchemaCommandHook {
    fn after_update(&self, dir: &Path) -> Result<HookOutcome> {
        let collaborator = |reason: String| ApiverError::Collaborator {
            dir: dir.to_path_buf(),
            reason,
        };

        if self.command.is_empty() {
            return Err(collaborator("schema hook has empty command".to_string()));
        }
        let argv = self.argv(dir);
        let (exe, args) = argv.split_at(1);
        let exe = &exe[0];

        info!(dir = %dir.display(), command = %argv.join(" "), "Running schema command");
        let status = Command::new(exe)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| collaborator(format!("failed to run {exe}: {e}")))?;

        if !status.success() {
            return Err(collaborator(match status.code() {
                Some(code) => format!("{exe} exited with status {code}"),
                None => format!("{exe} terminated by signal"),
            }));
        }
        Ok(HookOutcome::Ran)
    }
}

/// Pick the schema hook when a partner token is present, otherwise a no-op.
pub fn hook_for_credential(
    credential_present: bool,
    config: Option<String>,
) -> Box<dyn PostUpdateHook> {
    if credential_present {
        Box::new(SchemaCommandHook::new(config))
    } else {
        debug!("No partner credential; schema generation disabled");
        Box::new(NoopHook)
    }
}
