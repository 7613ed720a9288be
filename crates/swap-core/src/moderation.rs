//! Peer feedback and abuse reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rating one user leaves for another after a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    /// 1..=5
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Mean rating, or `None` without feedback.
pub fn average_rating(feedback: &[Feedback]) -> Option<f64> {
    if feedback.is_empty() {
        return None;
    }
    let total: i64 = feedback.iter().map(|f| f.rating).sum();
    Some(total as f64 / feedback.len() as f64)
}

/// What a report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ReportTarget {
    User(String),
    Group(String),
}

impl ReportTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportTarget::User(_) => "user",
            ReportTarget::Group(_) => "group",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ReportTarget::User(id) | ReportTarget::Group(id) => id,
        }
    }

    /// Rebuild from stored columns.
    pub fn from_parts(kind: &str, id: String) -> Option<Self> {
        match kind {
            "user" => Some(ReportTarget::User(id)),
            "group" => Some(ReportTarget::Group(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::Resolved => "resolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(ReportStatus::Open),
            "resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }
}

/// A user's report about another user or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub target: ReportTarget,
    pub reporter_id: String,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}
