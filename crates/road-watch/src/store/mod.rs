//! Repository backends shared by the hazard and reputation workflows.
//!
//! Both backends keep the whole state in one [`StoreSnapshot`]: users, reports with their
//! embedded votes, and the current session identity. [`MemoryStore`] keeps it in process,
//! [`SnapshotStore`] additionally writes it to a JSON file after every mutation.

mod memory;
mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::SnapshotStore;

use serde::{Deserialize, Serialize};

use crate::workflows::hazards::domain::{HazardReport, ReportId};
use crate::workflows::hazards::repository::ReportRepository;
use crate::workflows::reputation::domain::{User, UserId};
use crate::workflows::reputation::repository::UserRepository;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Persisted layout: two keyed collections plus the session's identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub reports: Vec<HazardReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserId>,
}

impl StoreSnapshot {
    fn user_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|user| &user.id == id)
    }

    fn report_mut(&mut self, id: &ReportId) -> Option<&mut HazardReport> {
        self.reports.iter_mut().find(|report| &report.id == id)
    }
}

/// Read/write access to a snapshot; every backend implementing it gets both
/// repository traits.
pub trait SnapshotCell: Send + Sync {
    fn read<T>(&self, op: impl FnOnce(&StoreSnapshot) -> T) -> Result<T, RepositoryError>;

    fn write<T>(
        &self,
        op: impl FnOnce(&mut StoreSnapshot) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError>;
}

impl<S: SnapshotCell> UserRepository for S {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        self.write(|state| {
            if state.users.iter().any(|existing| existing.id == user.id) {
                return Err(RepositoryError::Conflict);
            }
            state.users.push(user.clone());
            Ok(user)
        })
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        self.write(|state| {
            let slot = state.user_mut(&user.id).ok_or(RepositoryError::NotFound)?;
            *slot = user;
            Ok(())
        })
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.read(|state| state.users.iter().find(|user| &user.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<User>, RepositoryError> {
        self.read(|state| state.users.clone())
    }

    fn current(&self) -> Result<Option<UserId>, RepositoryError> {
        self.read(|state| state.current_user.clone())
    }

    fn set_current(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.write(|state| {
            if !state.users.iter().any(|user| &user.id == id) {
                return Err(RepositoryError::NotFound);
            }
            state.current_user = Some(id.clone());
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.write(|state| {
            state.users.clear();
            state.current_user = None;
            Ok(())
        })
    }
}

impl<S: SnapshotCell> ReportRepository for S {
    fn insert(&self, report: HazardReport) -> Result<HazardReport, RepositoryError> {
        self.write(|state| {
            if state.reports.iter().any(|existing| existing.id == report.id) {
                return Err(RepositoryError::Conflict);
            }
            state.reports.push(report.clone());
            Ok(report)
        })
    }

    fn update(&self, report: HazardReport) -> Result<(), RepositoryError> {
        self.write(|state| {
            let slot = state
                .report_mut(&report.id)
                .ok_or(RepositoryError::NotFound)?;
            *slot = report;
            Ok(())
        })
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<HazardReport>, RepositoryError> {
        self.read(|state| state.reports.iter().find(|report| &report.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<HazardReport>, RepositoryError> {
        self.read(|state| state.reports.clone())
    }

    fn remove(&self, id: &ReportId) -> Result<(), RepositoryError> {
        self.write(|state| {
            let before = state.reports.len();
            state.reports.retain(|report| &report.id != id);
            if state.reports.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        self.write(|state| {
            state.reports.clear();
            Ok(())
        })
    }
}
