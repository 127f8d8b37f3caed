//! In-memory hook fakes (testing only)
//!
//! `RecordingHook` satisfies the [`PostUpdateHook`] contract without spawning
//! processes, so orchestration can be exercised in isolation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ApiverError, Result};
use crate::hook::{HookOutcome, PostUpdateHook};

/// Hook that remembers every directory it was called with.
#[derive(Debug, Default)]
pub struct RecordingHook {
    calls: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording hook whose every call fails with a collaborator error.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::default(),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl PostUpdateHook for RecordingHook {
    fn after_update(&self, dir: &Path) -> Result<HookOutcome> {
        self.calls.lock().unwrap().push(dir.to_path_buf());
        if self.fail {
            return Err(ApiverError::Collaborator {
                dir: dir.to_path_buf(),
                reason: "recording hook configured to fail".to_string(),
            });
        }
        Ok(HookOutcome::Ran)
    }
}
