use chrono::{DateTime, Utc};

use super::domain::{Badge, BadgeId, BadgeRarity, User, BADGE_POINTS};

/// Counter a badge rule is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeMetric {
    Reports,
    Votes,
}

impl BadgeMetric {
    fn read(self, user: &User) -> u32 {
        match self {
            BadgeMetric::Reports => user.reports_count,
            BadgeMetric::Votes => user.votes_count,
        }
    }
}

/// Static unlock rule for a single badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeRule {
    pub id: BadgeId,
    pub rarity: BadgeRarity,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub requirement: &'static str,
    pub metric: BadgeMetric,
    pub threshold: u32,
}

impl BadgeRule {
    pub fn is_satisfied_by(&self, user: &User) -> bool {
        self.metric.read(user) >= self.threshold
    }

    fn grant(&self, earned_at: DateTime<Utc>) -> Badge {
        Badge {
            id: self.id,
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            rarity: self.rarity,
            requirement: self.requirement.to_string(),
            earned_at,
        }
    }
}

impl BadgeId {
    pub const fn rule(self) -> BadgeRule {
        match self {
            BadgeId::FirstReport => BadgeRule {
                id: self,
                rarity: BadgeRarity::Bronze,
                name: "First Report",
                description: "Submitted a first road hazard report",
                icon: "🚨",
                requirement: "1 report",
                metric: BadgeMetric::Reports,
                threshold: 1,
            },
            BadgeId::ActiveReporter => BadgeRule {
                id: self,
                rarity: BadgeRarity::Silver,
                name: "Active Reporter",
                description: "Submitted 10 road hazard reports",
                icon: "🏆",
                requirement: "10 reports",
                metric: BadgeMetric::Reports,
                threshold: 10,
            },
            BadgeId::ExpertReporter => BadgeRule {
                id: self,
                rarity: BadgeRarity::Gold,
                name: "Traffic Expert",
                description: "Submitted 50 road hazard reports",
                icon: "💎",
                requirement: "50 reports",
                metric: BadgeMetric::Reports,
                threshold: 50,
            },
            BadgeId::CommunityHelper => BadgeRule {
                id: self,
                rarity: BadgeRarity::Silver,
                name: "Community Helper",
                description: "Voted on 20 reports from other members",
                icon: "🤝",
                requirement: "20 votes",
                metric: BadgeMetric::Votes,
                threshold: 20,
            },
        }
    }
}

/// Grants every badge whose rule now holds and which the member does not already own.
///
/// Each grant is worth [`BADGE_POINTS`]. Running it again with unchanged counters grants
/// nothing.
pub fn evaluate_badges(user: &mut User, now: DateTime<Utc>) -> Vec<Badge> {
    let granted: Vec<Badge> = BadgeId::ALL
        .into_iter()
        .map(BadgeId::rule)
        .filter(|rule| rule.is_satisfied_by(user) && !user.has_badge(rule.id))
        .map(|rule| rule.grant(now))
        .collect();

    for badge in &granted {
        user.badges.push(badge.clone());
        user.credit(BADGE_POINTS);
    }

    granted
}
