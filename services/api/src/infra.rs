use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use road_watch::store::RepositoryError;
use road_watch::workflows::reputation::{LeaderboardSeed, UserRepository};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Synthetic members generated when a leaderboard seed is configured.
pub(crate) const SEEDED_MEMBERS: usize = 12;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Insert seeded members, skipping any already present from a previous run.
pub(crate) fn seed_members<U>(users: &U, seed: u64, count: usize) -> Result<usize, RepositoryError>
where
    U: UserRepository,
{
    let mut inserted = 0;
    for user in LeaderboardSeed::new(seed).users(count, Utc::now()) {
        match users.insert(user) {
            Ok(_) => inserted += 1,
            Err(RepositoryError::Conflict) => {}
            Err(err) => return Err(err),
        }
    }

    info!(seed, inserted, "leaderboard seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_watch::store::MemoryStore;

    #[test]
    fn seeding_twice_does_not_duplicate_members() {
        let store = MemoryStore::new();
        assert_eq!(seed_members(&store, 9, 4).expect("seeded"), 4);
        assert_eq!(seed_members(&store, 9, 4).expect("seeded"), 0);
        assert_eq!(UserRepository::all(&store).expect("read").len(), 4);
    }
}
