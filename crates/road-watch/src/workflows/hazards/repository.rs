use crate::store::RepositoryError;

use super::domain::{HazardReport, ReportId};

/// Storage abstraction for reports and their embedded votes.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, report: HazardReport) -> Result<HazardReport, RepositoryError>;
    fn update(&self, report: HazardReport) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<HazardReport>, RepositoryError>;
    /// Every report in submission order.
    fn all(&self) -> Result<Vec<HazardReport>, RepositoryError>;
    fn remove(&self, id: &ReportId) -> Result<(), RepositoryError>;
    fn clear(&self) -> Result<(), RepositoryError>;
}
