use chrono::Utc;
use clap::Args;
use road_watch::error::AppError;
use road_watch::geo::GeoPoint;
use road_watch::store::MemoryStore;
use road_watch::workflows::hazards::{
    HazardCategory, HazardService, ImageRef, Location, ReportDraft, VoteOutcome, VotePolicy,
    VoteType,
};
use road_watch::workflows::reputation::leaderboard::write_csv;
use road_watch::workflows::reputation::{rank, Badge, LeaderboardEntry, LeaderboardSeed};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct LeaderboardArgs {
    /// Seed for the synthetic member generator
    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,
    /// Number of synthetic members to generate
    #[arg(long, default_value_t = 10)]
    pub(crate) users: usize,
    /// Only print the top N entries
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Emit CSV instead of a table
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Let the reporter vote on their own report during the scenario
    #[arg(long)]
    pub(crate) allow_self_votes: bool,
    /// Number of peers confirming the report (three or more verifies it)
    #[arg(long, default_value_t = 3)]
    pub(crate) confirmations: usize,
}

pub(crate) fn run_leaderboard(args: LeaderboardArgs) -> Result<(), AppError> {
    let users = LeaderboardSeed::new(args.seed).users(args.users, Utc::now());
    let mut entries = rank(&users);
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if args.csv {
        write_csv(&entries, std::io::stdout().lock())?;
    } else {
        println!("Leaderboard (seed {})", args.seed);
        render_leaderboard(&entries);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(MemoryStore::new());
    let service = HazardService::new(
        store.clone(),
        store,
        VotePolicy {
            allow_self_votes: args.allow_self_votes,
        },
    );

    println!("Road hazard reporting demo");
    let reporter = service.ensure_user(Some("RoadWatcher".to_string()))?;
    println!("- session member: {} ({})", reporter.username, reporter.id);

    let report = service.submit_report(&reporter.id, demo_draft())?;
    println!(
        "- submitted {} [{}] at {}: {}",
        report.id,
        report.category.label(),
        report.location.display(),
        report.status.label()
    );

    let reporter_now = service.current_user()?;
    println!(
        "- reporter now has {} points, level {}",
        reporter_now.points, reporter_now.level
    );
    render_badges(&reporter_now.badges);

    println!("\nPeer verification");
    for index in 0..args.confirmations {
        let voter = service.register_user(Some(format!("Peer{:02}", index + 1)))?;
        let outcome = service.cast_vote(&report.id, &voter.id, VoteType::Confirm)?;
        render_vote(&voter.username, &outcome);
    }

    let skeptic = service.register_user(Some("Skeptic".to_string()))?;
    let outcome = service.cast_vote(&report.id, &skeptic.id, VoteType::Reject)?;
    render_vote(&skeptic.username, &outcome);

    let nearby = service.reports_near(GeoPoint::new(21.0300, 105.8500), None)?;
    println!("\n{} report(s) within 5 km of the city centre", nearby.len());

    let stats = service.stats(&reporter.id)?;
    println!(
        "\nReporter stats: {} points | level {} | {} to next level | {} verified | rank {}",
        stats.total_points,
        stats.level,
        stats.points_to_next_level,
        stats.verified_reports,
        stats
            .rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    println!("\nLeaderboard");
    render_leaderboard(&service.leaderboard(Some(5))?);
    Ok(())
}

fn demo_draft() -> ReportDraft {
    ReportDraft {
        location: Location {
            lat: 21.0285,
            lng: 105.8542,
            address: Some("Dinh Tien Hoang, Hoan Kiem, Ha Noi".to_string()),
            captured_at: Some(Utc::now()),
        },
        category: HazardCategory::Pothole,
        description: "Deep pothole in the right lane next to the bus stop".to_string(),
        images: vec![ImageRef("uploads/demo-pothole.jpg".to_string())],
        suggestion: None,
    }
}

fn render_vote(voter: &str, outcome: &VoteOutcome) {
    println!(
        "- {voter} voted: {} confirm(s), status {}",
        outcome.report.verification_count,
        outcome.report.status.label()
    );
    if let Some(transition) = outcome.transition {
        println!(
            "  status changed {} -> {}",
            transition.from.label(),
            transition.to.label()
        );
    }
    render_badges(&outcome.badges_granted);
}

fn render_badges(badges: &[Badge]) {
    for badge in badges {
        println!(
            "  {} {} ({}) unlocked",
            badge.icon,
            badge.name,
            badge.rarity.label()
        );
    }
}

fn render_leaderboard(entries: &[LeaderboardEntry]) {
    println!(
        "{:>4}  {:<18} {:>7} {:>5} {:>7} {:>8}",
        "rank", "member", "points", "level", "reports", "verified"
    );
    for entry in entries {
        println!(
            "{:>4}  {:<18} {:>7} {:>5} {:>7} {:>8}",
            entry.rank,
            entry.username,
            entry.points,
            entry.level,
            entry.reports_count,
            entry.verified_reports_count
        );
    }
}
