// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Atlas Vault Contributors

//! Record store trait and filesystem implementation.
//!
//! Storage failures are fatal to the in-progress operation and are not
//! retried; the caller surfaces them as an operation failure. Absence of a
//! record is `Ok(None)`, never an error, so callers can distinguish
//! "missing" from "broken".
//!
//! Usernames and record ids become path components under the store root,
//! so every operation validates them first: a key that is empty, `.`,
//! `..`, or contains a path separator is rejected with
//! [`StorageError::InvalidKey`] before any filesystem access.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::models::StoredUser;

use super::paths::StoragePaths;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("store not initialized")]
    NotInitialized,
}

/// Result type for record store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Classification of opaque record tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A sealed goal document
    Goal,
}

impl RecordKind {
    /// Directory name for this record kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            RecordKind::Goal => "goals",
        }
    }
}

/// Persistence substrate consumed by the session layer.
///
/// Implementations store user documents and opaque ciphertext tokens; they
/// never inspect token contents.
pub trait RecordStore {
    /// Load a user document, `None` if the user is unknown.
    fn get_user(&self, username: &str) -> StorageResult<Option<StoredUser>>;

    /// Create a user document; fails if the username is taken.
    fn create_user(&self, user: &StoredUser) -> StorageResult<()>;

    /// Overwrite an existing user document.
    fn put_user(&self, user: &StoredUser) -> StorageResult<()>;

    /// Load a record token, `None` if absent.
    fn get_record(
        &self,
        owner: &str,
        kind: RecordKind,
        id: &str,
    ) -> StorageResult<Option<String>>;

    /// Write (or overwrite) a record token.
    fn put_record(
        &self,
        owner: &str,
        kind: RecordKind,
        id: &str,
        token: &str,
    ) -> StorageResult<()>;

    /// Delete a record token; deleting an absent record is a no-op.
    fn delete_record(&self, owner: &str, kind: RecordKind, id: &str) -> StorageResult<()>;

    /// List the ids of all records an owner has of a given kind.
    fn list_record_ids(&self, owner: &str, kind: RecordKind) -> StorageResult<Vec<String>>;
}

/// Filesystem-backed record store.
///
/// JSON documents are written atomically (temp file, then rename) so a
/// crash mid-write never leaves a half-written user document behind.
#[derive(Debug, Clone)]
pub struct FsRecordStore {
    paths: StoragePaths,
    initialized: bool,
}

impl FsRecordStore {
    /// Create a new store over the given paths.
    ///
    /// Does NOT create the directory structure; call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Create the directory structure. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        fs::create_dir_all(self.paths.users_dir())?;
        fs::create_dir_all(self.paths.records_dir())?;
        self.initialized = true;
        Ok(())
    }

    fn check_initialized(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        Ok(())
    }

    /// Reject usernames and record ids that do not stay a single path
    /// component under the store root.
    fn check_key(key: &str) -> StorageResult<()> {
        let escapes = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0']);
        if escapes {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Write a file atomically: temp file first, then rename.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl RecordStore for FsRecordStore {
    fn get_user(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        self.check_initialized()?;
        Self::check_key(username)?;

        let path = self.paths.user(username);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let user = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(user))
    }

    fn create_user(&self, user: &StoredUser) -> StorageResult<()> {
        self.check_initialized()?;

        if self.get_user(&user.username)?.is_some() {
            return Err(StorageError::UserAlreadyExists(user.username.clone()));
        }
        self.put_user(user)
    }

    fn put_user(&self, user: &StoredUser) -> StorageResult<()> {
        self.check_initialized()?;
        Self::check_key(&user.username)?;

        let json = serde_json::to_vec_pretty(user)?;
        self.write_atomic(&self.paths.user(&user.username), &json)
    }

    fn get_record(
        &self,
        owner: &str,
        kind: RecordKind,
        id: &str,
    ) -> StorageResult<Option<String>> {
        self.check_initialized()?;
        Self::check_key(owner)?;
        Self::check_key(id)?;

        match fs::read_to_string(self.paths.record(owner, kind, id)) {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put_record(
        &self,
        owner: &str,
        kind: RecordKind,
        id: &str,
        token: &str,
    ) -> StorageResult<()> {
        self.check_initialized()?;
        Self::check_key(owner)?;
        Self::check_key(id)?;
        self.write_atomic(&self.paths.record(owner, kind, id), token.as_bytes())
    }

    fn delete_record(&self, owner: &str, kind: RecordKind, id: &str) -> StorageResult<()> {
        self.check_initialized()?;
        Self::check_key(owner)?;
        Self::check_key(id)?;

        match fs::remove_file(self.paths.record(owner, kind, id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_record_ids(&self, owner: &str, kind: RecordKind) -> StorageResult<Vec<String>> {
        self.check_initialized()?;
        Self::check_key(owner)?;

        let dir = self.paths.record_kind_dir(owner, kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "token") {
                if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verifier::PasswordVerifier;
    use base64ct::{Base64UrlUnpadded, Encoding};
    use std::env;

    fn test_store() -> FsRecordStore {
        let test_dir = env::temp_dir().join(format!("test-record-store-{}", uuid::Uuid::new_v4()));
        let mut store = FsRecordStore::new(StoragePaths::new(&test_dir));
        store.initialize().expect("failed to initialize test store");
        store
    }

    fn cleanup(store: &FsRecordStore) {
        let _ = fs::remove_dir_all(store.paths().root());
    }

    fn test_user(username: &str) -> StoredUser {
        StoredUser {
            username: username.into(),
            verifier: PasswordVerifier::new("pw"),
            key_salt: Base64UrlUnpadded::encode_string(&[7u8; 16]),
            encrypted_profile: String::new(),
            encrypted_net_worth: String::new(),
        }
    }

    #[test]
    fn unknown_user_is_none() {
        let store = test_store();
        assert!(store.get_user("nobody").unwrap().is_none());
        cleanup(&store);
    }

    #[test]
    fn create_and_get_user() {
        let store = test_store();
        store.create_user(&test_user("alice")).unwrap();

        let loaded = store.get_user("alice").unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert!(loaded.verifier.verify("pw"));

        cleanup(&store);
    }

    #[test]
    fn duplicate_user_fails() {
        let store = test_store();
        store.create_user(&test_user("alice")).unwrap();

        let result = store.create_user(&test_user("alice"));
        assert!(matches!(result, Err(StorageError::UserAlreadyExists(_))));

        cleanup(&store);
    }

    #[test]
    fn record_put_get_delete() {
        let store = test_store();

        assert!(store
            .get_record("alice", RecordKind::Goal, "g1")
            .unwrap()
            .is_none());

        store
            .put_record("alice", RecordKind::Goal, "g1", "opaque-token")
            .unwrap();
        assert_eq!(
            store.get_record("alice", RecordKind::Goal, "g1").unwrap(),
            Some("opaque-token".to_string())
        );

        store.delete_record("alice", RecordKind::Goal, "g1").unwrap();
        assert!(store
            .get_record("alice", RecordKind::Goal, "g1")
            .unwrap()
            .is_none());

        cleanup(&store);
    }

    #[test]
    fn delete_absent_record_is_noop() {
        let store = test_store();
        store
            .delete_record("alice", RecordKind::Goal, "missing")
            .unwrap();
        cleanup(&store);
    }

    #[test]
    fn list_record_ids_is_per_owner() {
        let store = test_store();

        for id in ["g1", "g2", "g3"] {
            store.put_record("alice", RecordKind::Goal, id, "t").unwrap();
        }
        store.put_record("bob", RecordKind::Goal, "other", "t").unwrap();

        let ids = store.list_record_ids("alice", RecordKind::Goal).unwrap();
        assert_eq!(ids, vec!["g1", "g2", "g3"]);

        let empty = store.list_record_ids("carol", RecordKind::Goal).unwrap();
        assert!(empty.is_empty());

        cleanup(&store);
    }

    #[test]
    fn overwrite_replaces_token() {
        let store = test_store();

        store.put_record("alice", RecordKind::Goal, "g1", "v1").unwrap();
        store.put_record("alice", RecordKind::Goal, "g1", "v2").unwrap();

        assert_eq!(
            store.get_record("alice", RecordKind::Goal, "g1").unwrap(),
            Some("v2".to_string())
        );

        cleanup(&store);
    }

    #[test]
    fn traversal_keys_are_rejected() {
        let store = test_store();

        for bad in ["../../escaped-user", "..", ".", "", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(store.get_user(bad), Err(StorageError::InvalidKey(_))),
                "get_user accepted {bad:?}"
            );
            assert!(
                matches!(
                    store.create_user(&test_user(bad)),
                    Err(StorageError::InvalidKey(_))
                ),
                "create_user accepted {bad:?}"
            );
            assert!(
                matches!(
                    store.put_record(bad, RecordKind::Goal, "g1", "t"),
                    Err(StorageError::InvalidKey(_))
                ),
                "put_record accepted owner {bad:?}"
            );
            assert!(
                matches!(
                    store.put_record("alice", RecordKind::Goal, bad, "t"),
                    Err(StorageError::InvalidKey(_))
                ),
                "put_record accepted id {bad:?}"
            );
            assert!(
                matches!(
                    store.delete_record(bad, RecordKind::Goal, "g1"),
                    Err(StorageError::InvalidKey(_))
                ),
                "delete_record accepted owner {bad:?}"
            );
            assert!(
                matches!(
                    store.list_record_ids(bad, RecordKind::Goal),
                    Err(StorageError::InvalidKey(_))
                ),
                "list_record_ids accepted owner {bad:?}"
            );
        }

        // Nothing may land outside the store root.
        let parent = store.paths().root().parent().unwrap().to_path_buf();
        assert!(!parent.join("escaped-user.json").exists());

        cleanup(&store);
    }

    #[test]
    fn uninitialized_store_returns_error() {
        let store = FsRecordStore::new(StoragePaths::new("/tmp/never-init"));
        let result = store.get_user("anyone");
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }
}
