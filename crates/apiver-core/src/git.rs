//! Git integration for limiting a run to changed config files.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{ApiverError, Result};
use crate::scanner::CONFIG_FILE_NAME;

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Config files under `root` that differ from `base` (tracked changes only).
///
/// Runs `git diff -z --name-only --relative <base>` inside `root`. NUL
/// separation keeps non-ASCII paths unquoted. Deleted files are dropped. The
/// result is sorted by path.
pub fn changed_config_files(root: &Path, base: &str) -> Result<Vec<PathBuf>> {
    std::fs::metadata(root).map_err(|source| ApiverError::Access {
        path: root.to_path_buf(),
        source,
    })?;
    if !is_git_repo(root) {
        return Err(ApiverError::Git(format!(
            "{} is not inside a git work tree",
            root.display()
        )));
    }

    let output = Command::new("git")
        .args(["diff", "-z", "--name-only", "--relative", base, "--"])
        .current_dir(root)
        .output()
        .map_err(|e| ApiverError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ApiverError::Git(format!(
            "git diff against {base} failed: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut files: Vec<PathBuf> = stdout
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(|entry| root.join(entry))
        .filter(|path| path.file_name().is_some_and(|n| n == CONFIG_FILE_NAME))
        .filter(|path| {
            let present = path.is_file();
            if !present {
                debug!(path = %path.display(), "Changed config no longer exists");
            }
            present
        })
        .collect();
    files.sort();
    files.dedup();

    debug!(base, changed = files.len(), "Resolved changed config files");
    Ok(files)
}
