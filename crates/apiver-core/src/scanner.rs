//! Discovery of `shopify.extension.toml` files.
//!
//! The walk is depth-first with directory entries sorted by file name, so a
//! fixed tree always yields the same order. Symbolic links are never followed
//! and only regular files match.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ApiverError, Result};

/// Reserved file name, matched by exact base-name equality.
pub const CONFIG_FILE_NAME: &str = "shopify.extension.toml";

/// Knobs for a tree walk.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory names that are not descended into (e.g. `node_modules`).
    pub exclude: Vec<String>,
}

impl ScanOptions {
    pub fn excluding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: names.into_iter().map(Into::into).collect(),
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }

    /// Whether any directory between `root` and `path` is excluded.
    ///
    /// Used to apply exclusions to file lists that did not come from a walk.
    pub fn excludes_path(&self, root: &Path, path: &Path) -> bool {
        let rel = path.strip_prefix(root).unwrap_or(path);
        rel.parent().is_some_and(|dirs| {
            dirs.components()
                .any(|c| self.is_excluded(&c.as_os_str().to_string_lossy()))
        })
    }
}

/// A subtree the walk could not enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a tree walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Matching files in walk order.
    pub files: Vec<PathBuf>,
    /// Nested directories that could not be read.
    pub skipped: Vec<SkippedDir>,
}

/// Collect every config file under `root`.
///
/// Unreadable nested directories are skipped; see [`scan`] to inspect them.
pub fn find_config_files(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(scan(root, &ScanOptions::default())?.files)
}

/// Walk `root` and report matching files plus any skipped subtrees.
///
/// Fails with [`ApiverError::Access`] only when `root` itself is missing,
/// not a directory, or unreadable.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let meta = fs::metadata(root).map_err(|source| ApiverError::Access {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ApiverError::Access {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    let entries = sorted_entries(root).map_err(|source| ApiverError::Access {
        path: root.to_path_buf(),
        source,
    })?;

    let mut report = ScanReport::default();
    visit_entries(entries, options, &mut report);
    debug!(
        root = %root.display(),
        found = report.files.len(),
        skipped = report.skipped.len(),
        "Scan complete"
    );
    Ok(report)
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn visit_dir(dir: &Path, options: &ScanOptions, report: &mut ScanReport) {
    match sorted_entries(dir) {
        Ok(entries) => visit_entries(entries, options, report),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            report.skipped.push(SkippedDir {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }
}

fn visit_entries(entries: Vec<fs::DirEntry>, options: &ScanOptions, report: &mut ScanReport) {
    for entry in entries {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping entry with unknown type");
                report.skipped.push(SkippedDir {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let name = entry.file_name();
        if file_type.is_dir() {
            if options.is_excluded(&name.to_string_lossy()) {
                debug!(path = %path.display(), "Excluded directory");
                continue;
            }
            visit_dir(&path, options, report);
        } else if file_type.is_file() && name == CONFIG_FILE_NAME {
            report.files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "api_version = \"2023-01\"\n").unwrap();
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn order_is_lexicographic_depth_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b/shopify.extension.toml");
        touch(dir.path(), "a/z/shopify.extension.toml");
        touch(dir.path(), "a/shopify.extension.toml");

        let files = find_config_files(dir.path()).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("a/shopify.extension.toml"),
                PathBuf::from("a/z/shopify.extension.toml"),
                PathBuf::from("b/shopify.extension.toml"),
            ]
        );
    }

    #[test]
    fn directory_named_like_config_is_not_a_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("shopify.extension.toml")).unwrap();
        assert!(find_config_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn excluded_directories_are_not_walked() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "node_modules/pkg/shopify.extension.toml");
        touch(dir.path(), "extensions/a/shopify.extension.toml");

        let report = scan(dir.path(), &ScanOptions::excluding(["node_modules"])).unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].ends_with("extensions/a/shopify.extension.toml"));
    }

    #[test]
    fn excludes_path_checks_directories_only() {
        let root = Path::new("/repo");
        let options = ScanOptions::excluding(["node_modules"]);
        assert!(options.excludes_path(
            root,
            Path::new("/repo/node_modules/pkg/shopify.extension.toml")
        ));
        assert!(!options.excludes_path(
            root,
            Path::new("/repo/extensions/a/shopify.extension.toml")
        ));
        assert!(!ScanOptions::excluding(["shopify.extension.toml"])
            .excludes_path(root, Path::new("/repo/shopify.extension.toml")));
    }

    #[test]
    fn missing_root_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_config_files(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Access);
    }

    #[test]
    fn file_root_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "shopify.extension.toml");
        let err = find_config_files(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Access);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loops_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "ext/shopify.extension.toml");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("ext/loop")).unwrap();

        let report = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped_and_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a/shopify.extension.toml");
        touch(dir.path(), "b/shopify.extension.toml");
        let locked = dir.path().join("a");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // running with privileges that ignore permission bits
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = scan(dir.path(), &ScanOptions::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let report = report.unwrap();

        assert_eq!(report.files, vec![dir.path().join("b/shopify.extension.toml")]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, locked);
        assert!(!report.skipped[0].reason.is_empty());
    }
}
