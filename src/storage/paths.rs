// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Path constants and utilities for the on-disk store layout.

use std::path::{Path, PathBuf};

use super::record_store::RecordKind;

/// Default root directory for persistent storage.
pub const DATA_ROOT: &str = "data";

/// Path utilities for the record store filesystem layout.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Resolve the root from the `DATA_DIR` environment variable, falling
    /// back to the default.
    pub fn from_env() -> Self {
        match std::env::var(crate::config::DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::default(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user documents.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, username: &str) -> PathBuf {
        self.users_dir().join(format!("{username}.json"))
    }

    // ========== Record Paths ==========

    /// Directory containing all record tokens, across owners.
    pub fn records_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    /// Directory for one owner's records of a given kind.
    pub fn record_kind_dir(&self, owner: &str, kind: RecordKind) -> PathBuf {
        self.records_dir().join(owner).join(kind.dir_name())
    }

    /// Path to a specific record token.
    pub fn record(&self, owner: &str, kind: RecordKind, id: &str) -> PathBuf {
        self.record_kind_dir(owner, kind).join(format!("{id}.token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(paths.root(), Path::new("/tmp/test-data"));
        assert_eq!(
            paths.user("alice"),
            PathBuf::from("/tmp/test-data/users/alice.json")
        );
    }

    #[test]
    fn record_paths_are_correct() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(
            paths.record_kind_dir("alice", RecordKind::Goal),
            PathBuf::from("/tmp/test-data/records/alice/goals")
        );
        assert_eq!(
            paths.record("alice", RecordKind::Goal, "g-1"),
            PathBuf::from("/tmp/test-data/records/alice/goals/g-1.token")
        );
    }
}
