//! Member identity, points, levels, badges, and the leaderboard projection.

pub(crate) mod badges;
pub mod domain;
pub mod engine;
pub mod fixtures;
pub mod leaderboard;
pub mod repository;

pub use badges::{evaluate_badges, BadgeMetric, BadgeRule};
pub use domain::{
    level_for, Badge, BadgeId, BadgeRarity, GameStats, User, UserId, BADGE_POINTS,
    POINTS_PER_LEVEL, REPORT_POINTS, VOTE_POINTS,
};
pub use fixtures::LeaderboardSeed;
pub use leaderboard::{rank, LeaderboardEntry};
pub use repository::UserRepository;
