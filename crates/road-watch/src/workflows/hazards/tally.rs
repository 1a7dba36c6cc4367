use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::domain::{HazardReport, ReportStatus, Vote, VoteId, VoteType};
use crate::workflows::reputation::domain::UserId;

/// Minimum number of agreeing votes before a report can leave `Pending`.
pub const VERIFICATION_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoteTally {
    pub confirm: u32,
    pub reject: u32,
}

impl VoteTally {
    pub fn from_votes(votes: &[Vote]) -> Self {
        votes.iter().fold(Self::default(), |mut tally, vote| {
            match vote.vote_type {
                VoteType::Confirm => tally.confirm += 1,
                VoteType::Reject => tally.reject += 1,
            }
            tally
        })
    }

    pub fn status(self) -> ReportStatus {
        derive_status(self.confirm, self.reject)
    }
}

/// Status as a pure function of the two counts. A tie at or above the threshold
/// stays `Pending`.
pub fn derive_status(confirm: u32, reject: u32) -> ReportStatus {
    if confirm >= VERIFICATION_THRESHOLD && confirm > reject {
        ReportStatus::Verified
    } else if reject >= VERIFICATION_THRESHOLD && reject > confirm {
        ReportStatus::Rejected
    } else {
        ReportStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub from: ReportStatus,
    pub to: ReportStatus,
}

impl StatusTransition {
    pub fn entered_verified(&self) -> bool {
        self.to == ReportStatus::Verified
    }

    pub fn left_verified(&self) -> bool {
        self.from == ReportStatus::Verified
    }
}

/// Upsert the voter's vote, then recompute cached counts and status from the full
/// vote set. Returns the transition when the status changed.
pub(crate) fn apply_vote(
    report: &mut HazardReport,
    voter_id: &UserId,
    vote_type: VoteType,
    now: DateTime<Utc>,
) -> Option<StatusTransition> {
    match report
        .votes
        .iter_mut()
        .find(|vote| &vote.voter_id == voter_id)
    {
        Some(existing) => {
            existing.vote_type = vote_type;
            existing.cast_at = now;
        }
        None => report.votes.push(Vote {
            id: VoteId(format!("vote_{}", Uuid::new_v4().simple())),
            voter_id: voter_id.clone(),
            report_id: report.id.clone(),
            vote_type,
            cast_at: now,
        }),
    }

    recompute(report)
}

pub(crate) fn recompute(report: &mut HazardReport) -> Option<StatusTransition> {
    let tally = VoteTally::from_votes(&report.votes);
    let previous = report.status;

    report.verification_count = tally.confirm;
    report.status = tally.status();
    report.is_verified = report.status == ReportStatus::Verified;

    (previous != report.status).then_some(StatusTransition {
        from: previous,
        to: report.status,
    })
}
