use std::cmp::Ordering;
use std::io::Write;

use serde::Serialize;

use super::domain::{User, UserId};

/// Ranked, read-only snapshot of a member's reputation at projection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub username: String,
    pub points: u64,
    pub level: u64,
    pub reports_count: u32,
    pub verified_reports_count: u32,
}

/// Ordering used for ranking: points descending, then verified reports descending,
/// then earlier join date, then user id so equal records never swap places.
fn standing(a: &User, b: &User) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.verified_reports_count.cmp(&a.verified_reports_count))
        .then_with(|| a.join_date.cmp(&b.join_date))
        .then_with(|| a.id.cmp(&b.id))
}

/// Project members into consecutive 1-based ranks.
pub fn rank(users: &[User]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&User> = users.iter().collect();
    ordered.sort_by(|a, b| standing(a, b));

    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(user, rank)| LeaderboardEntry {
            rank,
            user_id: user.id.clone(),
            username: user.username.clone(),
            points: user.points,
            level: user.level,
            reports_count: user.reports_count,
            verified_reports_count: user.verified_reports_count,
        })
        .collect()
}

/// Rank of a single member within the projection, if present.
pub fn rank_of(entries: &[LeaderboardEntry], user_id: &UserId) -> Option<u32> {
    entries
        .iter()
        .find(|entry| &entry.user_id == user_id)
        .map(|entry| entry.rank)
}

pub fn write_csv<W: Write>(entries: &[LeaderboardEntry], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}
