//! apiver - keep Shopify extension configs on the current API version
//!
//! Walks a repository for `shopify.extension.toml` files, sets `api_version`
//! to the current quarterly release and, when `SHOPIFY_CLI_PARTNERS_TOKEN` is
//! present, regenerates each function's schema with the Shopify CLI.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use apiver_core::{
    hook_for_credential, init_tracing, ApiVersion, LogFormat, NoopHook, Orchestrator,
    PostUpdateHook, RunOptions, RunSummary, ScanOptions, ScanScope,
};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn, Level};

/// Environment variable whose presence enables schema generation.
const PARTNER_TOKEN_VAR: &str = "SHOPIFY_CLI_PARTNERS_TOKEN";

#[derive(Parser, Debug)]
#[command(name = "apiver")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Bump api_version in every shopify.extension.toml to the current quarter",
    long_about = None
)]
struct Cli {
    /// Repository root to scan
    #[arg(default_value = ".")]
    root: PathBuf,

    /// App config name passed to `shopify app function schema --config`
    #[arg(long, env = "INPUT_CONFIG")]
    config: Option<String>,

    /// Only touch config files changed relative to this git ref
    #[arg(long, value_name = "REF")]
    changed_since: Option<String>,

    /// Directory name to skip while scanning (repeatable)
    #[arg(long = "exclude", value_name = "DIR_NAME")]
    exclude: Vec<String>,

    /// Resolve the version for this date instead of today (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Report what would change without writing files or running the schema command
    #[arg(long)]
    dry_run: bool,

    /// Never run the schema command, even with a partner token present
    #[arg(long)]
    no_hook: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,

    /// Append a Markdown report to this file
    #[arg(long, env = "GITHUB_STEP_SUMMARY", value_name = "PATH")]
    step_summary: Option<PathBuf>,

    /// Exit successfully even if some files failed
    #[arg(long)]
    allow_failures: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

impl Cli {
    fn version(&self) -> ApiVersion {
        match self.date {
            Some(date) => ApiVersion::for_date(&date),
            None => ApiVersion::current(),
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            scope: match &self.changed_since {
                Some(base) => ScanScope::ChangedSince(base.clone()),
                None => ScanScope::FullTree,
            },
            scan: ScanOptions::excluding(self.exclude.iter().cloned()),
            dry_run: self.dry_run,
        }
    }

    fn hook(&self) -> Box<dyn PostUpdateHook> {
        if self.no_hook {
            return Box::new(NoopHook);
        }
        let credential_present = std::env::var_os(PARTNER_TOKEN_VAR).is_some();
        hook_for_credential(credential_present, self.config.clone())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let format = if cli.json { LogFormat::Json } else { LogFormat::Text };
    init_tracing(format, level);

    let hook = cli.hook();
    let summary = Orchestrator::new(cli.version(), hook.as_ref())
        .with_options(cli.run_options())
        .run(&cli.root)
        .with_context(|| format!("Failed to sync api_version under {:?}", cli.root))?;

    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.render_line());
        for failure in &summary.failures {
            println!("  {} [{}]: {}", failure.path.display(), failure.kind, failure.message);
        }
    }

    if let Some(path) = &cli.step_summary {
        if let Err(e) = append_step_summary(path, &summary) {
            warn!(path = %path.display(), error = %e, "Could not write step summary");
        }
    }

    if let Some(message) = failure_message(&summary) {
        if !cli.allow_failures {
            anyhow::bail!(message);
        }
    }
    info!(updated = summary.updated_count(), "Done");
    Ok(())
}

/// Exit message for a run that recorded failures.
///
/// Failures can come from skipped directories that never counted towards
/// `found`, so the message counts failures rather than files.
fn failure_message(summary: &RunSummary) -> Option<String> {
    if summary.is_success() {
        return None;
    }
    Some(format!(
        "{} failure(s) recorded ({} config file(s) found, {} updated)",
        summary.failed_count(),
        summary.found,
        summary.updated_count()
    ))
}

fn append_step_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {:?}", path))?;
    file.write_all(summary.render_markdown().as_bytes())?;
    Ok(())
}
