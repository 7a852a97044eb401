//! Approval record types and lifecycle rules.
//!
//! Approvals gate bulk changes (description-block edits, mass updates,
//! syncs, ...) before they are applied to videos. Records are owned by the
//! data store; this module only describes their shape and the literal sets
//! that make up the wire contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ApprovalId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Review state of an approval.
///
/// `Pending` is the only initial state. `Approved` and `Rejected` are
/// terminal; the backend never moves a record out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Return the status literal as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parse a status literal. Matching is exact; returns `None` otherwise.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether no further transitions are allowed out of this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Statuses reachable from `self`.
    pub fn valid_transitions(&self) -> &'static [ApprovalStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["PENDING", "APPROVED", "REJECTED"];
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a status change reported by the backend.
pub fn validate_status_transition(
    from: ApprovalStatus,
    to: ApprovalStatus,
) -> Result<(), CoreError> {
    if from.valid_transitions().contains(&to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Invalid approval transition: {from} -> {to}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

/// Kind of bulk change an approval guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalType {
    BlockChange,
    MassUpdate,
    SyncOperation,
    CategoryChange,
    TagUpdate,
    SeasonalTemplate,
}

impl ApprovalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockChange => "BLOCK_CHANGE",
            Self::MassUpdate => "MASS_UPDATE",
            Self::SyncOperation => "SYNC_OPERATION",
            Self::CategoryChange => "CATEGORY_CHANGE",
            Self::TagUpdate => "TAG_UPDATE",
            Self::SeasonalTemplate => "SEASONAL_TEMPLATE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BLOCK_CHANGE" => Some(Self::BlockChange),
            "MASS_UPDATE" => Some(Self::MassUpdate),
            "SYNC_OPERATION" => Some(Self::SyncOperation),
            "CATEGORY_CHANGE" => Some(Self::CategoryChange),
            "TAG_UPDATE" => Some(Self::TagUpdate),
            "SEASONAL_TEMPLATE" => Some(Self::SeasonalTemplate),
            _ => None,
        }
    }

    /// All valid approval type values.
    pub const ALL: &'static [&'static str] = &[
        "BLOCK_CHANGE",
        "MASS_UPDATE",
        "SYNC_OPERATION",
        "CATEGORY_CHANGE",
        "TAG_UPDATE",
        "SEASONAL_TEMPLATE",
    ];
}

impl std::fmt::Display for ApprovalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A pending or decided bulk change, as read from the data store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
    pub status: ApprovalStatus,
    #[serde(rename = "type")]
    pub approval_type: ApprovalType,
    /// Number of videos the proposed change would touch.
    pub affected_videos_count: u32,
    /// Creation time exactly as delivered by the store. Kept as text so a
    /// malformed value degrades one statistic instead of the whole snapshot.
    pub created_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Approval {
    /// Parsed creation instant, or `None` if `created_at` is malformed.
    pub fn created_instant(&self) -> Option<Timestamp> {
        parse_timestamp(&self.created_at)
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

/// Layouts with an explicit offset that RFC 3339 parsing rejects, such as
/// Postgres `timestamptz` text (`2026-10-14 08:00:00+00`) and `+0000` offsets.
const OFFSET_TIMESTAMP_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Accepted offset-less layouts, read as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Date-only layout, read as UTC midnight.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a store timestamp.
///
/// Tried in order: RFC 3339 (`2026-03-01T12:00:00Z`, `...+02:00`), the
/// layouts in [`OFFSET_TIMESTAMP_FORMATS`], the offset-less layouts in
/// [`NAIVE_TIMESTAMP_FORMATS`], then a bare date.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
