//! Hazard report intake, peer voting, and status derivation.
//!
//! Reports are submitted by members, voted on by peers, and move between `Pending`,
//! `Verified`, and `Rejected` purely as a function of their current vote set. Every
//! submission and vote also flows through the reputation engine so the acting member
//! is credited in the same unit of work.

pub mod domain;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod service;
pub mod tally;

#[cfg(test)]
mod tests;

pub use domain::{
    CategorySuggestion, HazardCategory, HazardReport, ImageRef, Location, ReportDraft, ReportId,
    ReportStatus, Vote, VoteId, VoteType,
};
pub use intake::{IntakeGuard, IntakePolicy, IntakeViolation};
pub use repository::ReportRepository;
pub use router::hazard_router;
pub use service::{HazardService, HazardServiceError, VoteOutcome, VotePolicy};
pub use tally::{derive_status, StatusTransition, VoteTally, VERIFICATION_THRESHOLD};
