//! Freshness classification of resolved releases

use chrono::{DateTime, Months, Utc};

use crate::release::types::Severity;

/// Days below which a release is critical
pub const CRITICAL_DAYS: i64 = 3;

/// Days below which a release is a warning
pub const WARNING_DAYS: i64 = 7;

/// Days elapsed and severity tier of a publish timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    /// Effective publish time the days were computed from
    pub published_at: DateTime<Utc>,
    pub days: i64,
    pub severity: Severity,
}

impl Severity {
    pub fn from_days(days: i64) -> Self {
        if days < CRITICAL_DAYS {
            Severity::Critical
        } else if days < WARNING_DAYS {
            Severity::Warning
        } else {
            Severity::White
        }
    }
}

/// Whole days between `published_at` and `now`, truncated.
///
/// Timestamps in the future count as zero days.
pub fn days_since(published_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((now - published_at).num_hours() / 24).max(0)
}

pub fn classify(published_at: DateTime<Utc>, now: DateTime<Utc>) -> Freshness {
    let days = days_since(published_at, now);
    Freshness {
        published_at,
        days,
        severity: Severity::from_days(days),
    }
}

/// Classifies a package version, overriding collections whose upstream
/// timestamps cannot be trusted.
///
/// Overridden packages are pinned one month before `now` with an `unknown`
/// severity.
pub fn classify_package(
    collection: &str,
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
    unreliable_collections: &[String],
) -> Freshness {
    let unreliable = unreliable_collections
        .iter()
        .any(|prefix| collection.starts_with(prefix.as_str()));

    if !unreliable {
        return classify(published_at, now);
    }

    let pinned = now.checked_sub_months(Months::new(1)).unwrap_or(now);
    Freshness {
        published_at: pinned,
        days: days_since(pinned, now),
        severity: Severity::Unknown,
    }
}
