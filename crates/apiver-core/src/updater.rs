//! Read-modify-write of a single config file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::document::ConfigDocument;
use crate::error::{ApiverError, Result};
use crate::version::ApiVersion;

/// What an update did (or would do) to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub path: PathBuf,
    /// `api_version` before the update, if the key existed.
    pub previous: Option<String>,
    pub version: ApiVersion,
    /// Whether the value differs from `previous`.
    pub changed: bool,
}

/// Rewritten file contents, not yet persisted.
#[derive(Debug, Clone)]
pub struct PlannedUpdate {
    pub outcome: UpdateOutcome,
    pub contents: String,
}

/// Set `api_version` in `path` to today's version (UTC).
pub fn update_file(path: &Path) -> Result<UpdateOutcome> {
    update_file_to(path, &ApiVersion::current())
}

/// Set `api_version` in `path` to `version` and write the file back.
pub fn update_file_to(path: &Path, version: &ApiVersion) -> Result<UpdateOutcome> {
    let plan = plan_update(path, version)?;
    write_atomic(path, &plan.contents)?;
    debug!(path = %path.display(), version = %version, "Wrote config");
    Ok(plan.outcome)
}

/// Read, parse, mutate and serialize `path` without touching the disk.
pub fn plan_update(path: &Path, version: &ApiVersion) -> Result<PlannedUpdate> {
    let text = fs::read_to_string(path).map_err(|source| ApiverError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut doc = ConfigDocument::parse(&text).map_err(|source| ApiverError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let previous = doc.set_api_version(version).map(|v| match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    });

    let contents = doc.to_toml_string().map_err(|source| ApiverError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let changed = previous.as_deref() != Some(version.to_string().as_str());
    Ok(PlannedUpdate {
        outcome: UpdateOutcome {
            path: path.to_path_buf(),
            previous,
            version: *version,
            changed,
        },
        contents,
    })
}

/// Directory holding `path`; `.` for a bare file name.
pub fn containing_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Replace `path` with `contents` via a temp file in the same directory.
///
/// The original file's permissions carry over to the new one.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source: std::io::Error| ApiverError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(containing_dir(path)).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
