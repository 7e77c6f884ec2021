//! Core domain types for a single report invocation.
//!
//! Nothing here outlives one run: values are produced by the fetch phase,
//! joined, rendered, and dropped.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How far back each report looks.
pub const LOOKBACK_HOURS: i64 = 24;

/// Name shown for a category id with no metadata entry.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// Description shown for a category id with no metadata entry.
pub const UNKNOWN_CATEGORY_DESCRIPTION: &str = "Description not available";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one invocation (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Mint a new identifier for the current invocation.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TimeWindow
// ---------------------------------------------------------------------------

/// Lower bound applied to every analytics query of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    since: DateTime<Utc>,
}

impl TimeWindow {
    /// The window covering the [`LOOKBACK_HOURS`] before `now`.
    pub fn trailing(now: DateTime<Utc>) -> Self {
        Self {
            since: now - Duration::hours(LOOKBACK_HOURS),
        }
    }

    /// Start of the window.
    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    /// ISO-8601 UTC timestamp with second precision, e.g. `2026-10-17T08:30:00Z`.
    pub fn to_iso8601(&self) -> String {
        self.since.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

// ---------------------------------------------------------------------------
// EventRecord
// ---------------------------------------------------------------------------

/// The grouping value of an aggregated analytics row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDimension {
    /// Queried domain name.
    Domain(String),
    /// Upstream content category id.
    Category(u32),
}

/// One aggregated row returned by an analytics query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Number of resolver events in the group.
    pub count: u64,
    /// What the events were grouped by.
    pub dimension: EventDimension,
}

impl EventRecord {
    pub fn domain(name: impl Into<String>, count: u64) -> Self {
        Self {
            count,
            dimension: EventDimension::Domain(name.into()),
        }
    }

    pub fn category(id: u32, count: u64) -> Self {
        Self {
            count,
            dimension: EventDimension::Category(id),
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryLabel
// ---------------------------------------------------------------------------

/// Human-readable name and description attached to a category id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLabel {
    pub name: String,
    pub description: String,
}

impl CategoryLabel {
    /// Placeholder label for ids missing from the metadata listing.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_CATEGORY_NAME.into(),
            description: UNKNOWN_CATEGORY_DESCRIPTION.into(),
        }
    }
}
