use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{HazardReport, ReportDraft, ReportId, ReportStatus, VoteType};
use super::intake::{IntakeGuard, IntakeViolation};
use super::repository::ReportRepository;
use super::tally::{self, StatusTransition};
use crate::config::CommunityConfig;
use crate::geo::{self, GeoPoint, MapBounds};
use crate::store::RepositoryError;
use crate::workflows::reputation::domain::{Badge, GameStats, User, UserId};
use crate::workflows::reputation::engine;
use crate::workflows::reputation::leaderboard::{self, LeaderboardEntry};
use crate::workflows::reputation::repository::UserRepository;

/// Voting rules the service enforces on top of the tally engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VotePolicy {
    pub allow_self_votes: bool,
}

impl From<&CommunityConfig> for VotePolicy {
    fn from(config: &CommunityConfig) -> Self {
        Self {
            allow_self_votes: config.allow_self_votes,
        }
    }
}

/// Result of a cast vote: the updated report, the credited voter, and what changed.
#[derive(Debug, Clone, Serialize)]
pub struct VoteOutcome {
    pub report: HazardReport,
    pub voter: User,
    pub badges_granted: Vec<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<StatusTransition>,
}

/// One persisted change and the state needed to take it back.
enum Change {
    InsertReport(HazardReport),
    UpdateReport {
        next: HazardReport,
        previous: HazardReport,
    },
    UpdateUser {
        next: User,
        previous: User,
    },
}

/// Service composing the report and user repositories with the tally and reputation
/// engines.
///
/// Mutating operations hold a single writer lock for their whole duration, so votes on
/// the same report are serialized. A report or vote and the reputation credit it earns
/// are committed together: when any write fails, the writes already applied are
/// reverted before the error is returned.
pub struct HazardService<U, R> {
    users: Arc<U>,
    reports: Arc<R>,
    guard: IntakeGuard,
    policy: VotePolicy,
    writer: Mutex<()>,
}

impl<U, R> HazardService<U, R>
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    pub fn new(users: Arc<U>, reports: Arc<R>, policy: VotePolicy) -> Self {
        Self::with_guard(IntakeGuard::default(), users, reports, policy)
    }

    pub fn with_guard(
        guard: IntakeGuard,
        users: Arc<U>,
        reports: Arc<R>,
        policy: VotePolicy,
    ) -> Self {
        Self {
            users,
            reports,
            guard,
            policy,
            writer: Mutex::new(()),
        }
    }

    fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a member without touching the session's current identity.
    pub fn register_user(&self, username: Option<String>) -> Result<User, HazardServiceError> {
        let _writer = self.exclusive();
        self.create_user(username, Utc::now())
    }

    fn create_user(
        &self,
        username: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<User, HazardServiceError> {
        let username = username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(anonymous_username);
        let user = User::new(next_user_id(), username, now);
        let stored = self.users.insert(user)?;
        info!(user_id = %stored.id, username = %stored.username, "member registered");
        Ok(stored)
    }

    /// Return the session's member, creating and selecting one when none exists yet.
    pub fn ensure_user(&self, username: Option<String>) -> Result<User, HazardServiceError> {
        let _writer = self.exclusive();
        if let Some(id) = self.users.current()? {
            if let Some(user) = self.users.fetch(&id)? {
                return Ok(user);
            }
        }

        let user = self.create_user(username, Utc::now())?;
        self.users.set_current(&user.id)?;
        Ok(user)
    }

    pub fn current_user(&self) -> Result<User, HazardServiceError> {
        let id = self
            .users
            .current()?
            .ok_or(HazardServiceError::NotInitialized)?;
        self.users
            .fetch(&id)?
            .ok_or(HazardServiceError::NotInitialized)
    }

    /// Accept a new report from `reporter_id`, crediting the reporter.
    pub fn submit_report(
        &self,
        reporter_id: &UserId,
        draft: ReportDraft,
    ) -> Result<HazardReport, HazardServiceError> {
        let draft = self.guard.accept(draft)?;

        let _writer = self.exclusive();
        let now = Utc::now();
        let mut reporter = self
            .users
            .fetch(reporter_id)?
            .ok_or(HazardServiceError::NotInitialized)?;

        let previous = reporter.clone();
        let stored = HazardReport::new(next_report_id(), reporter.id.clone(), draft, now);
        let granted = engine::record_report(&mut reporter, now);
        self.commit(vec![
            Change::InsertReport(stored.clone()),
            Change::UpdateUser {
                next: reporter,
                previous,
            },
        ])?;

        info!(
            report_id = %stored.id,
            reporter_id = %reporter_id,
            category = stored.category.label(),
            badges = granted.len(),
            "hazard report submitted"
        );
        log_badges(reporter_id, &granted);

        Ok(stored)
    }

    /// Upsert `voter_id`'s vote on a report, recompute its status, and credit the voter.
    pub fn cast_vote(
        &self,
        report_id: &ReportId,
        voter_id: &UserId,
        vote_type: VoteType,
    ) -> Result<VoteOutcome, HazardServiceError> {
        let _writer = self.exclusive();
        let now = Utc::now();

        let mut report = self
            .reports
            .fetch(report_id)?
            .ok_or_else(|| HazardServiceError::ReportNotFound(report_id.clone()))?;
        if report.status == ReportStatus::Resolved {
            warn!(report_id = %report_id, voter_id = %voter_id, "vote on resolved report refused");
            return Err(HazardServiceError::ReportResolved(report_id.clone()));
        }

        let mut voter = self
            .users
            .fetch(voter_id)?
            .ok_or(HazardServiceError::NotInitialized)?;
        if !self.policy.allow_self_votes && &report.reporter_id == voter_id {
            warn!(report_id = %report_id, voter_id = %voter_id, "self vote refused");
            return Err(HazardServiceError::SelfVote);
        }

        let previous_report = report.clone();
        let previous_voter = voter.clone();
        let transition = tally::apply_vote(&mut report, voter_id, vote_type, now);
        let badges_granted = engine::record_vote(&mut voter, now);

        let mut changes = vec![Change::UpdateReport {
            next: report.clone(),
            previous: previous_report,
        }];
        if let Some(change) = transition.filter(|t| t.entered_verified() || t.left_verified()) {
            if report.reporter_id == voter.id {
                engine::record_verification_change(&mut voter, change.entered_verified());
            } else {
                match self.users.fetch(&report.reporter_id)? {
                    Some(previous) => {
                        let mut reporter = previous.clone();
                        engine::record_verification_change(
                            &mut reporter,
                            change.entered_verified(),
                        );
                        changes.push(Change::UpdateUser {
                            next: reporter,
                            previous,
                        });
                    }
                    None => {
                        warn!(
                            reporter_id = %report.reporter_id,
                            "reporter missing; verified count not updated"
                        );
                    }
                }
            }
        }
        changes.push(Change::UpdateUser {
            next: voter.clone(),
            previous: previous_voter,
        });
        self.commit(changes)?;

        info!(
            report_id = %report_id,
            voter_id = %voter_id,
            vote = ?vote_type,
            confirm = report.verification_count,
            status = report.status.label(),
            "vote recorded"
        );
        if let Some(change) = transition {
            info!(
                report_id = %report_id,
                from = change.from.label(),
                to = change.to.label(),
                "report status changed"
            );
        }
        log_badges(voter_id, &badges_granted);

        Ok(VoteOutcome {
            report,
            voter,
            badges_granted,
            transition,
        })
    }

    /// Apply `changes` in order; on the first failure, revert the applied ones in reverse.
    fn commit(&self, changes: Vec<Change>) -> Result<(), HazardServiceError> {
        let mut applied = Vec::with_capacity(changes.len());
        for change in changes {
            let written = match &change {
                Change::InsertReport(report) => self.reports.insert(report.clone()).map(|_| ()),
                Change::UpdateReport { next, .. } => self.reports.update(next.clone()),
                Change::UpdateUser { next, .. } => self.users.update(next.clone()),
            };
            if let Err(err) = written {
                warn!(error = %err, reverted = applied.len(), "write failed; reverting");
                self.revert(applied);
                return Err(err.into());
            }
            applied.push(change);
        }
        Ok(())
    }

    fn revert(&self, applied: Vec<Change>) {
        for change in applied.into_iter().rev() {
            let reverted = match change {
                Change::InsertReport(report) => self.reports.remove(&report.id),
                Change::UpdateReport { previous, .. } => self.reports.update(previous),
                Change::UpdateUser { previous, .. } => self.users.update(previous),
            };
            if let Err(err) = reverted {
                warn!(error = %err, "revert failed; store may hold a partial write");
            }
        }
    }

    /// Administrative transition to the terminal `Resolved` state.
    pub fn resolve_report(&self, report_id: &ReportId) -> Result<HazardReport, HazardServiceError> {
        let _writer = self.exclusive();
        let mut report = self
            .reports
            .fetch(report_id)?
            .ok_or_else(|| HazardServiceError::ReportNotFound(report_id.clone()))?;

        if report.status != ReportStatus::Resolved {
            let from = report.status;
            report.status = ReportStatus::Resolved;
            self.reports.update(report.clone())?;
            info!(report_id = %report_id, from = from.label(), "report resolved");
        }

        Ok(report)
    }

    pub fn report(&self, report_id: &ReportId) -> Result<HazardReport, HazardServiceError> {
        self.reports
            .fetch(report_id)?
            .ok_or_else(|| HazardServiceError::ReportNotFound(report_id.clone()))
    }

    /// Reports within `radius_km` of `point`, in submission order.
    pub fn reports_near(
        &self,
        point: GeoPoint,
        radius_km: Option<f64>,
    ) -> Result<Vec<HazardReport>, HazardServiceError> {
        let radius_km = radius_km.unwrap_or(geo::DEFAULT_SEARCH_RADIUS_KM);
        Ok(self
            .reports
            .all()?
            .into_iter()
            .filter(|report| geo::within_radius(point, report.location.point(), radius_km))
            .collect())
    }

    pub fn reports_in_bounds(
        &self,
        bounds: MapBounds,
    ) -> Result<Vec<HazardReport>, HazardServiceError> {
        Ok(self
            .reports
            .all()?
            .into_iter()
            .filter(|report| bounds.contains(report.location.point()))
            .collect())
    }

    pub fn leaderboard(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, HazardServiceError> {
        let mut entries = leaderboard::rank(&self.users.all()?);
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub fn stats(&self, user_id: &UserId) -> Result<GameStats, HazardServiceError> {
        let users = self.users.all()?;
        let user = users
            .iter()
            .find(|user| &user.id == user_id)
            .ok_or_else(|| HazardServiceError::UnknownUser(user_id.clone()))?;
        let rank = leaderboard::rank_of(&leaderboard::rank(&users), user_id);

        Ok(GameStats {
            user_id: user.id.clone(),
            total_points: user.points,
            level: user.level,
            points_to_next_level: user.points_to_next_level(),
            total_reports: user.reports_count,
            verified_reports: user.verified_reports_count,
            total_votes: user.votes_count,
            badges: user.badges.clone(),
            rank,
        })
    }

    /// Wipe every member and report.
    pub fn reset(&self) -> Result<(), HazardServiceError> {
        let _writer = self.exclusive();
        self.reports.clear()?;
        self.users.clear()?;
        info!("community data cleared");
        Ok(())
    }
}

fn log_badges(user_id: &UserId, badges: &[Badge]) {
    for badge in badges {
        info!(
            user_id = %user_id,
            badge = badge.id.as_str(),
            rarity = badge.rarity.label(),
            "badge granted"
        );
    }
}

fn next_report_id() -> ReportId {
    ReportId(format!("report_{}", Uuid::new_v4().simple()))
}

fn next_user_id() -> UserId {
    UserId(format!("user_{}", Uuid::new_v4().simple()))
}

fn anonymous_username() -> String {
    format!("Agent{:04}", rand::thread_rng().gen_range(0..10_000))
}

/// Error raised by the hazard service.
#[derive(Debug, thiserror::Error)]
pub enum HazardServiceError {
    #[error("user not initialized")]
    NotInitialized,
    #[error("report {0} not found")]
    ReportNotFound(ReportId),
    #[error("user {0} not found")]
    UnknownUser(UserId),
    #[error("members cannot vote on their own reports")]
    SelfVote,
    #[error("report {0} is resolved and no longer accepts votes")]
    ReportResolved(ReportId),
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
