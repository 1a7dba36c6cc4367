use chrono::{DateTime, Utc};

use super::badges::evaluate_badges;
use super::domain::{Badge, User, REPORT_POINTS, VOTE_POINTS};

/// Credit a member for a submitted report and return any badges it unlocked.
pub fn record_report(user: &mut User, now: DateTime<Utc>) -> Vec<Badge> {
    user.reports_count = user.reports_count.saturating_add(1);
    user.credit(REPORT_POINTS);
    user.touch(now);
    evaluate_badges(user, now)
}

/// Credit a member for a cast vote and return any badges it unlocked.
pub fn record_vote(user: &mut User, now: DateTime<Utc>) -> Vec<Badge> {
    user.votes_count = user.votes_count.saturating_add(1);
    user.credit(VOTE_POINTS);
    user.touch(now);
    evaluate_badges(user, now)
}

/// Track the reporter's verified count as their report moves in or out of verification.
pub fn record_verification_change(user: &mut User, became_verified: bool) {
    user.verified_reports_count = if became_verified {
        user.verified_reports_count.saturating_add(1)
    } else {
        user.verified_reports_count.saturating_sub(1)
    };
}
