use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::workflows::reputation::domain::UserId;

/// Identifier wrapper for submitted hazard reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for individual votes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteId(pub String);

/// Opaque reference to an uploaded image; the core never holds image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(pub String);

/// Resolved position supplied by the geolocation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl Location {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Street address when known, otherwise the coordinates to six decimals.
    pub fn display(&self) -> String {
        match &self.address {
            Some(address) if !address.trim().is_empty() => address.clone(),
            _ => format!("{:.6}, {:.6}", self.lat, self.lng),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardCategory {
    FadedLines,
    BrokenRoad,
    TrafficLightIssue,
    Pothole,
    MissingSign,
    Debris,
    Other,
}

impl HazardCategory {
    pub const fn label(self) -> &'static str {
        match self {
            HazardCategory::FadedLines => "faded_lines",
            HazardCategory::BrokenRoad => "broken_road",
            HazardCategory::TrafficLightIssue => "traffic_light_issue",
            HazardCategory::Pothole => "pothole",
            HazardCategory::MissingSign => "missing_sign",
            HazardCategory::Debris => "debris",
            HazardCategory::Other => "other",
        }
    }
}

/// Verification lifecycle of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Verified,
    Rejected,
    /// Terminal; only reachable through an administrative action.
    Resolved,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Verified => "verified",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Confirm,
    Reject,
}

/// A single member's opinion on a report. At most one exists per (voter, report).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: UserId,
    pub report_id: ReportId,
    pub vote_type: VoteType,
    pub cast_at: DateTime<Utc>,
}

/// Advisory classification from the image-analysis collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category: HazardCategory,
    pub confidence: f32,
}

/// Inbound payload for a new report, before intake checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub location: Location,
    pub category: HazardCategory,
    pub description: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<CategorySuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardReport {
    pub id: ReportId,
    pub location: Location,
    pub category: HazardCategory,
    pub description: String,
    pub images: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<CategorySuggestion>,
    pub reporter_id: UserId,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub votes: Vec<Vote>,
    pub verification_count: u32,
    pub is_verified: bool,
}

impl HazardReport {
    pub fn new(
        id: ReportId,
        reporter_id: UserId,
        draft: ReportDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            location: draft.location,
            category: draft.category,
            description: draft.description,
            images: draft.images,
            suggestion: draft.suggestion,
            reporter_id,
            created_at,
            status: ReportStatus::Pending,
            votes: Vec::new(),
            verification_count: 0,
            is_verified: false,
        }
    }

    pub fn vote_by(&self, voter_id: &UserId) -> Option<&Vote> {
        self.votes.iter().find(|vote| &vote.voter_id == voter_id)
    }
}
