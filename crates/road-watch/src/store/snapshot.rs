use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{RepositoryError, SnapshotCell, StoreSnapshot};

/// File-backed backend. The snapshot is loaded wholesale on open and rewritten after
/// every mutation; a mutation whose write fails leaves the in-memory state untouched.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    state: Mutex<StoreSnapshot>,
}

impl SnapshotStore {
    /// Open the snapshot at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let raw = fs::read(&path).map_err(|err| unavailable(&path, err))?;
            serde_json::from_slice(&raw).map_err(|err| unavailable(&path, err))?
        } else {
            StoreSnapshot::default()
        };

        debug!(
            path = %path.display(),
            users = snapshot.users.len(),
            reports = snapshot.reports.len(),
            "snapshot loaded"
        );

        Ok(Self {
            path,
            state: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreSnapshot>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), RepositoryError> {
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(|err| unavailable(&self.path, err))?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| unavailable(&self.path, err))?;
        }

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, bytes).map_err(|err| unavailable(&staging, err))?;
        fs::rename(&staging, &self.path).map_err(|err| unavailable(&self.path, err))?;

        debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }
}

impl SnapshotCell for SnapshotStore {
    fn read<T>(&self, op: impl FnOnce(&StoreSnapshot) -> T) -> Result<T, RepositoryError> {
        let guard = self.lock()?;
        Ok(op(&guard))
    }

    fn write<T>(
        &self,
        op: impl FnOnce(&mut StoreSnapshot) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let value = op(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(value)
    }
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reputation::domain::{User, UserId};
    use crate::workflows::reputation::repository::UserRepository;
    use chrono::Utc;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::open(dir.path().join("state.json")).expect("opens");
        assert!(store.all().expect("read").is_empty());
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.json");
        let id = UserId("user-persisted".to_string());

        {
            let store = SnapshotStore::open(&path).expect("opens");
            store
                .insert(User::new(id.clone(), "Agent5150", Utc::now()))
                .expect("insert");
            store.set_current(&id).expect("current");
        }

        let reopened = SnapshotStore::open(&path).expect("reopens");
        assert_eq!(reopened.current().expect("read"), Some(id.clone()));
        let user = reopened.fetch(&id).expect("read").expect("present");
        assert_eq!(user.username, "Agent5150");
    }

    #[test]
    fn failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        let kept = UserId("user-kept".to_string());
        let store = SnapshotStore::open(&path).expect("opens");
        store
            .insert(User::new(kept.clone(), "Agent0001", Utc::now()))
            .expect("insert");

        fs::remove_file(&path).expect("remove snapshot");
        fs::create_dir(&path).expect("block snapshot path");
        fs::write(path.join("occupied"), b"x").expect("occupy");

        let lost = User::new(UserId("user-lost".to_string()), "Agent0002", Utc::now());
        assert!(matches!(
            UserRepository::insert(&store, lost),
            Err(RepositoryError::Unavailable(_))
        ));

        let users = UserRepository::all(&store).expect("read");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, kept);
        assert!(UserRepository::fetch(&store, &UserId("user-lost".to_string()))
            .expect("read")
            .is_none());
    }

    #[test]
    fn corrupt_file_is_reported_as_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").expect("write");

        assert!(matches!(
            SnapshotStore::open(&path),
            Err(RepositoryError::Unavailable(_))
        ));
    }
}
