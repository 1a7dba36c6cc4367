use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::domain::{User, UserId};
use super::engine::{record_report, record_vote, record_verification_change};

const CALLSIGNS: [&str; 8] = [
    "TrafficHero",
    "SafetyGuard",
    "RoadWatcher",
    "CityPatrol",
    "EagleEye",
    "LaneKeeper",
    "SignSpotter",
    "CrossingScout",
];

/// Deterministic generator of synthetic leaderboard members for demos and tests.
///
/// Members are built by replaying reports and votes through the reputation engine, so
/// their points, levels, and badges are consistent with real activity.
pub struct LeaderboardSeed {
    seed: u64,
    rng: StdRng,
}

impl LeaderboardSeed {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn users(&mut self, count: usize, anchor: DateTime<Utc>) -> Vec<User> {
        (0..count).map(|index| self.user(index, anchor)).collect()
    }

    fn user(&mut self, index: usize, anchor: DateTime<Utc>) -> User {
        let callsign = CALLSIGNS[self.rng.gen_range(0..CALLSIGNS.len())];
        let suffix: u16 = self.rng.gen_range(1..100);
        let joined = anchor - Duration::days(self.rng.gen_range(1..365));

        let mut user = User::new(
            UserId(format!("seed-{}-{index:03}", self.seed)),
            format!("{callsign}{suffix:02}"),
            joined,
        );

        let reports: u32 = self.rng.gen_range(0..30);
        let votes: u32 = self.rng.gen_range(0..45);
        for _ in 0..reports {
            record_report(&mut user, joined);
        }
        for _ in 0..votes {
            record_vote(&mut user, joined);
        }
        for _ in 0..self.rng.gen_range(0..=reports) {
            record_verification_change(&mut user, true);
        }
        user.last_active = anchor;
        user
    }
}
