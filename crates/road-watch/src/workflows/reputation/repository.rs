use crate::store::RepositoryError;

use super::domain::{User, UserId};

/// Storage abstraction for member profiles and the session's current identity.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn all(&self) -> Result<Vec<User>, RepositoryError>;
    fn current(&self) -> Result<Option<UserId>, RepositoryError>;
    fn set_current(&self, id: &UserId) -> Result<(), RepositoryError>;
    /// Remove every member and forget the current identity.
    fn clear(&self) -> Result<(), RepositoryError>;
}
