use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points credited for each submitted report.
pub const REPORT_POINTS: u64 = 10;
/// Points credited for each vote cast, regardless of outcome.
pub const VOTE_POINTS: u64 = 2;
/// Points credited for every newly unlocked badge.
pub const BADGE_POINTS: u64 = 50;
pub const POINTS_PER_LEVEL: u64 = 100;

/// Identifier wrapper for community members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reputation profile for an anonymous community member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub points: u64,
    pub level: u64,
    pub badges: Vec<Badge>,
    pub reports_count: u32,
    pub verified_reports_count: u32,
    pub votes_count: u32,
    pub join_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: username.into(),
            points: 0,
            level: level_for(0),
            badges: Vec::new(),
            reports_count: 0,
            verified_reports_count: 0,
            votes_count: 0,
            join_date: now,
            last_active: now,
        }
    }

    pub fn has_badge(&self, badge: BadgeId) -> bool {
        self.badges.iter().any(|earned| earned.id == badge)
    }

    /// Points are additive only; the level is re-derived on every credit.
    pub(crate) fn credit(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
        self.level = level_for(self.points);
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    pub fn points_to_next_level(&self) -> u64 {
        self.level
            .saturating_mul(POINTS_PER_LEVEL)
            .saturating_sub(self.points)
    }
}

/// `floor(points / 100) + 1`, unbounded.
pub const fn level_for(points: u64) -> u64 {
    points / POINTS_PER_LEVEL + 1
}

/// Closed set of achievements a member can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstReport,
    ActiveReporter,
    ExpertReporter,
    CommunityHelper,
}

impl BadgeId {
    pub const ALL: [BadgeId; 4] = [
        BadgeId::FirstReport,
        BadgeId::ActiveReporter,
        BadgeId::ExpertReporter,
        BadgeId::CommunityHelper,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BadgeId::FirstReport => "first_report",
            BadgeId::ActiveReporter => "active_reporter",
            BadgeId::ExpertReporter => "expert_reporter",
            BadgeId::CommunityHelper => "community_helper",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl BadgeRarity {
    pub const fn label(self) -> &'static str {
        match self {
            BadgeRarity::Bronze => "bronze",
            BadgeRarity::Silver => "silver",
            BadgeRarity::Gold => "gold",
            BadgeRarity::Platinum => "platinum",
            BadgeRarity::Diamond => "diamond",
        }
    }
}

/// A granted badge. Immutable once it lands in a member's badge set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: BadgeRarity,
    pub requirement: String,
    pub earned_at: DateTime<Utc>,
}

/// Dashboard projection of a member's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    pub user_id: UserId,
    pub total_points: u64,
    pub level: u64,
    pub points_to_next_level: u64,
    pub total_reports: u32,
    pub verified_reports: u32,
    pub total_votes: u32,
    pub badges: Vec<Badge>,
    pub rank: Option<u32>,
}
