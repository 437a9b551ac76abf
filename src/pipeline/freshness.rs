use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::models::Category;

pub const DEFAULT_MAX_AGE_HOURS: u32 = 60;

/// Compact ages injected by aggregators (`2mo`, `3w`, `1y`, `1yr`), lower-case only.
/// They count at the end of a line or right after a `·`, `•` or `|` separator,
/// so product specs like `65W` or `1yr warranty` are left alone.
const COMPACT_UNITS: &str = "mo|mos|w|wk|wks|y|yr|yrs";

static COMPACT_AGE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)\b(\d+)({COMPACT_UNITS})[ \t]*$")).expect("age pattern must compile")
});

static COMPACT_AGE_SEPARATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[·•|]\s*(\d+)({COMPACT_UNITS})\b")).expect("age pattern must compile")
});

/// Spelled-out ages: `5 weeks ago`, `published 3 months ago`.
static SPELLED_AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(months?|years?|weeks?)\s+ago\b").expect("age pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    /// Missing timestamp or older than the effective max age.
    TooOld,
    /// The text itself carries an old-age marker.
    StaleMarker,
}

/// Effective max age for `category` given the user's setting.
pub fn effective_max_age_hours(category: Category, max_age_hours: u32) -> u32 {
    match category.max_age_override_hours() {
        Some(cap) => cap.min(max_age_hours),
        None => max_age_hours,
    }
}

/// Items without a publish time never pass: their age cannot be verified.
pub fn is_fresh(
    published_at: Option<DateTime<Utc>>,
    category: Category,
    max_age_hours: u32,
    now: DateTime<Utc>,
) -> bool {
    let Some(published_at) = published_at else {
        return false;
    };
    let max_age = Duration::hours(i64::from(effective_max_age_hours(category, max_age_hours)));
    now.signed_duration_since(published_at) <= max_age
}

pub fn has_stale_marker(text: &str) -> bool {
    [&*COMPACT_AGE_TAIL_RE, &*COMPACT_AGE_SEPARATED_RE, &*SPELLED_AGE_RE].iter().any(|pattern| {
        pattern.captures_iter(text).any(|caps| {
            let count: u64 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let unit = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            is_stale_unit(&unit, count)
        })
    })
}

/// Month and year units are always stale, weeks from one upwards.
fn is_stale_unit(unit: &str, count: u64) -> bool {
    if unit.starts_with('w') {
        count >= 1
    } else {
        unit.starts_with('m') || unit.starts_with('y')
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FreshnessGate {
    max_age_hours: u32,
}

impl FreshnessGate {
    pub fn new(max_age_hours: u32) -> Self {
        Self { max_age_hours }
    }

    pub fn check(
        &self,
        published_at: Option<DateTime<Utc>>,
        category: Category,
        text: &str,
        now: DateTime<Utc>,
    ) -> Staleness {
        if !is_fresh(published_at, category, self.max_age_hours, now) {
            Staleness::TooOld
        } else if has_stale_marker(text) {
            Staleness::StaleMarker
        } else {
            Staleness::Fresh
        }
    }
}

impl Default for FreshnessGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_HOURS)
    }
}
