//! Error taxonomy for apiver.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors produced while scanning, rewriting or notifying.
///
/// Every variant names the path it concerns so failures can be reported
/// per file without extra bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum ApiverError {
    #[error("cannot read directory {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("post-update command failed for {}: {reason}", dir.display())]
    Collaborator { dir: PathBuf, reason: String },

    #[error("git error: {0}")]
    Git(String),
}

impl ApiverError {
    /// Coarse classification used in summaries and tests.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiverError::Access { .. } => ErrorKind::Access,
            ApiverError::Read { .. } => ErrorKind::Read,
            ApiverError::Parse { .. } => ErrorKind::Parse,
            ApiverError::Serialize { .. } | ApiverError::Write { .. } => ErrorKind::Write,
            ApiverError::Collaborator { .. } => ErrorKind::Collaborator,
            ApiverError::Git(_) => ErrorKind::Git,
        }
    }
}

/// Result type for apiver operations.
pub type Result<T> = std::result::Result<T, ApiverError>;

/// Error classes surfaced in a [`RunSummary`](crate::RunSummary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Access,
    Read,
    Parse,
    Write,
    Collaborator,
    Git,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Access => "access",
            ErrorKind::Read => "read",
            ErrorKind::Parse => "parse",
            ErrorKind::Write => "write",
            ErrorKind::Collaborator => "collaborator",
            ErrorKind::Git => "git",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
