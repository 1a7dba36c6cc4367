use std::sync::{Mutex, MutexGuard};

use super::{RepositoryError, SnapshotCell, StoreSnapshot};

/// Process-local backend; state is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreSnapshot>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl SnapshotCell for MemoryStore {
    fn read<T>(&self, op: impl FnOnce(&StoreSnapshot) -> T) -> Result<T, RepositoryError> {
        let guard = self.lock()?;
        Ok(op(&guard))
    }

    fn write<T>(
        &self,
        op: impl FnOnce(&mut StoreSnapshot) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        op(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reputation::domain::{User, UserId};
    use crate::workflows::reputation::repository::UserRepository;
    use chrono::Utc;

    fn user(id: &str) -> User {
        User::new(UserId(id.to_string()), "Agent1234", Utc::now())
    }

    #[test]
    fn insert_rejects_duplicates() {
        let store = MemoryStore::new();
        store.insert(user("u-1")).expect("first insert");
        assert!(matches!(
            store.insert(user("u-1")),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn update_requires_existing_record() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update(user("ghost")),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn current_identity_must_exist() {
        let store = MemoryStore::new();
        let id = UserId("u-2".to_string());
        assert!(matches!(
            store.set_current(&id),
            Err(RepositoryError::NotFound)
        ));

        store.insert(user("u-2")).expect("insert");
        store.set_current(&id).expect("current set");
        assert_eq!(store.current().expect("read"), Some(id));

        store.clear().expect("clear");
        assert_eq!(store.current().expect("read"), None);
        assert!(store.all().expect("read").is_empty());
    }
}
