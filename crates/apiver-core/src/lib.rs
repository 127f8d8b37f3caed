//! apiver Core Library
//!
//! Keeps every `shopify.extension.toml` in a repository on the current
//! quarterly API version:
//! - [`version`] resolves the release-train version for a date
//! - [`scanner`] finds config files in a tree
//! - [`updater`] rewrites `api_version` in one file
//! - [`orchestrator`] runs a batch and notifies a [`PostUpdateHook`]

pub mod document;
pub mod error;
pub mod fakes;
pub mod git;
pub mod hook;
pub mod orchestrator;
pub mod report;
pub mod scanner;
pub mod telemetry;
pub mod updater;
pub mod version;

pub use document::{ConfigDocument, API_VERSION_KEY};
pub use error::{ApiverError, ErrorKind, Result};
pub use git::{changed_config_files, is_git_repo};
pub use hook::{hook_for_credential, HookOutcome, NoopHook, PostUpdateHook, SchemaCommandHook};
pub use orchestrator::{run, Orchestrator, RunOptions, ScanScope};
pub use report::{Failure, RunSummary};
pub use scanner::{find_config_files, scan, ScanOptions, ScanReport, SkippedDir, CONFIG_FILE_NAME};
pub use telemetry::{init_tracing, LogFormat};
pub use updater::{containing_dir, plan_update, update_file, update_file_to, UpdateOutcome};
pub use version::{resolve, ApiVersion, InvalidApiVersion, Quarter};

/// apiver version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
