//! Batch aggregation: gating, bucketing into timeline and sections, and the
//! weekly plan.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::models::{
    Category, Digest, NormalizedItem, PlanDay, PlannerEntry, PlannerRecord, SectionItem,
    TimelineDay, TimelineItem, WeeklyPlan,
};

use super::dates::day_key;
use super::dedup::BatchDedup;
use super::freshness::{FreshnessGate, Staleness};
use super::relevance::{FilterLayer, RelevanceFilter};

pub const SECTION_CAP: usize = 5;
pub const WEEKLY_PLAN_DAYS: i64 = 7;
/// Festival mentions may trail their date by this many days.
const FESTIVAL_GRACE_DAYS: i64 = 3;
/// Undated alerts land on today only while this recent.
const ALERT_RECENCY_HOURS: i64 = 24;

/// The instant a batch is evaluated against, and the calendar day it falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

impl ReferenceTime {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }

    /// Reference where "today" is the UTC date of `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::new(now, now.date_naive())
    }

    pub fn local_now() -> Self {
        let local = Local::now();
        Self::new(local.with_timezone(&Utc), local.date_naive())
    }
}

/// Per-stage drop counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub received: usize,
    pub duplicates: usize,
    pub category_disabled: usize,
    pub unfresh: usize,
    pub stale_marker: usize,
    pub negative: usize,
    pub no_positive_signal: usize,
    pub location: usize,
    pub kept: usize,
    pub in_timeline: usize,
    pub in_sections: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub digest: Digest,
    pub stats: StageStats,
    /// Survivors with an extracted date, ready for the planner.
    pub planner_candidates: Vec<PlannerEntry>,
}

#[derive(Debug, Default)]
pub struct Aggregator {
    relevance: RelevanceFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionOrder {
    Recency,
    Soonest,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relevance(&self) -> &RelevanceFilter {
        &self.relevance
    }

    pub fn aggregate(
        &self,
        items: Vec<NormalizedItem>,
        settings: &Settings,
        reference: ReferenceTime,
    ) -> Aggregation {
        let mut stats = StageStats::default();
        let kept = self.filter(items, settings, reference, &mut stats);

        let sections = build_sections(&kept, settings, reference.today, &mut stats);
        let timeline = build_timeline(&kept, reference, &mut stats);
        let weekly_plan = build_weekly_plan(&timeline, reference.today);

        let planner_candidates = kept
            .iter()
            .filter_map(|item| {
                item.extracted_date.map(|date| PlannerEntry {
                    record: PlannerRecord {
                        id: item.id.clone(),
                        title: item.title.clone(),
                        category: item.category,
                        link: item.link.clone(),
                        added_at: reference.now,
                    },
                    date,
                })
            })
            .collect();

        info!(
            "Aggregated {}/{} items: {} timeline days, {} section entries",
            stats.kept,
            stats.received,
            timeline.len(),
            stats.in_sections
        );

        Aggregation {
            digest: Digest {
                timeline,
                sections,
                weekly_plan,
                last_updated: reference.now.to_rfc3339(),
            },
            stats,
            planner_candidates,
        }
    }

    /// Dedup, enable flags, freshness and relevance, in that order.
    fn filter(
        &self,
        items: Vec<NormalizedItem>,
        settings: &Settings,
        reference: ReferenceTime,
        stats: &mut StageStats,
    ) -> Vec<NormalizedItem> {
        let gate = FreshnessGate::new(settings.hide_older_than_hours);
        let mut dedup = BatchDedup::new();
        let mut kept = Vec::new();

        for mut item in items {
            stats.received += 1;

            if !dedup.insert(&item.id) {
                stats.duplicates += 1;
                continue;
            }
            if !settings.is_enabled(item.category) {
                stats.category_disabled += 1;
                continue;
            }

            // separate lines so a marker ending the title still ends a line
            let text = format!("{}\n{}", item.title, item.description);
            match gate.check(item.published_at, item.category, &text, reference.now) {
                Staleness::Fresh => {}
                Staleness::TooOld => {
                    debug!("Dropping {} as too old or undated", item.id);
                    stats.unfresh += 1;
                    continue;
                }
                Staleness::StaleMarker => {
                    debug!("Dropping {} for a stale age marker", item.id);
                    stats.stale_marker += 1;
                    continue;
                }
            }

            let relevance = self
                .relevance
                .evaluate(&item, &settings.keywords, &settings.locations);
            match relevance.dropped_by {
                None => {}
                Some(FilterLayer::Negative) => {
                    debug!(
                        "Dropping {} on negative keyword {:?}",
                        item.id, relevance.matched
                    );
                    stats.negative += 1;
                    continue;
                }
                Some(FilterLayer::PositiveSignal) => {
                    debug!("Dropping {} without a positive signal", item.id);
                    stats.no_positive_signal += 1;
                    continue;
                }
                Some(FilterLayer::Location) => {
                    debug!("Dropping {} without a configured location", item.id);
                    stats.location += 1;
                    continue;
                }
            }

            item.forward_score = relevance.forward_score;
            stats.kept += 1;
            kept.push(item);
        }

        kept
    }
}

fn section_order(category: Category) -> SectionOrder {
    match category {
        Category::Alerts | Category::WeatherAlerts | Category::Civic => SectionOrder::Recency,
        _ => SectionOrder::Soonest,
    }
}

fn section_eligible(item: &NormalizedItem, today: NaiveDate) -> bool {
    if item.category.is_alert() || item.is_roundup {
        return true;
    }
    let Some(date) = item.extracted_date else {
        return false;
    };
    let earliest = if item.category == Category::Festivals {
        today - Duration::days(FESTIVAL_GRACE_DAYS)
    } else {
        today
    };
    date.last_day() >= earliest
}

fn compare_for_section(order: SectionOrder, a: &NormalizedItem, b: &NormalizedItem) -> Ordering {
    let primary = match order {
        // newest first, undated last
        SectionOrder::Recency => match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        // soonest first, undated roundups last
        SectionOrder::Soonest => match (a.extracted_date, b.extracted_date) {
            (Some(x), Some(y)) => x.start.cmp(&y.start),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };
    primary.then_with(|| b.forward_score.cmp(&a.forward_score))
}

fn build_sections(
    kept: &[NormalizedItem],
    settings: &Settings,
    today: NaiveDate,
    stats: &mut StageStats,
) -> BTreeMap<Category, Vec<SectionItem>> {
    let mut buckets: BTreeMap<Category, Vec<&NormalizedItem>> = Category::ALL
        .iter()
        .filter(|c| **c != Category::General && settings.is_enabled(**c))
        .map(|c| (*c, Vec::new()))
        .collect();

    for item in kept {
        if !section_eligible(item, today) {
            continue;
        }
        if let Some(bucket) = buckets.get_mut(&item.category) {
            bucket.push(item);
        }
    }

    buckets
        .into_iter()
        .map(|(category, mut items)| {
            let order = section_order(category);
            items.sort_by(|a, b| compare_for_section(order, a, b));
            items.truncate(SECTION_CAP);
            stats.in_sections += items.len();
            (category, items.into_iter().map(section_item).collect())
        })
        .collect()
}

/// Calendar day an item belongs to on the timeline, if any.
fn target_date(item: &NormalizedItem, reference: ReferenceTime) -> Option<NaiveDate> {
    let today = reference.today;
    if let Some(date) = item.extracted_date {
        if date.last_day() < today {
            return None;
        }
        // ongoing ranges show up from today
        return Some(date.start.max(today));
    }
    if item.category.is_alert() {
        let recent = item.published_at.is_some_and(|published| {
            reference.now.signed_duration_since(published) <= Duration::hours(ALERT_RECENCY_HOURS)
        });
        if recent {
            return Some(today);
        }
    }
    if item.is_roundup {
        return Some(today);
    }
    None
}

fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%A").to_string(),
    }
}

fn build_timeline(
    kept: &[NormalizedItem],
    reference: ReferenceTime,
    stats: &mut StageStats,
) -> Vec<TimelineDay> {
    let mut days: BTreeMap<NaiveDate, Vec<&NormalizedItem>> = BTreeMap::new();
    for item in kept {
        if let Some(date) = target_date(item, reference) {
            days.entry(date).or_default().push(item);
            stats.in_timeline += 1;
        }
    }

    days.into_iter()
        .map(|(date, mut items)| {
            items.sort_by(|a, b| b.forward_score.cmp(&a.forward_score));
            TimelineDay {
                date_key: day_key(date),
                label: day_label(date, reference.today),
                items: items.into_iter().map(timeline_item).collect(),
            }
        })
        .collect()
}

fn build_weekly_plan(timeline: &[TimelineDay], today: NaiveDate) -> WeeklyPlan {
    let days = (0..WEEKLY_PLAN_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let key = day_key(date);
            let items = timeline
                .iter()
                .find(|d| d.date_key == key)
                .map(|d| d.items.clone())
                .unwrap_or_default();
            PlanDay {
                day: date.format("%A").to_string(),
                date_key: key,
                items,
            }
        })
        .collect();
    WeeklyPlan { days }
}

fn timeline_item(item: &NormalizedItem) -> TimelineItem {
    TimelineItem {
        id: item.id.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        link: item.link.clone(),
        category: item.category,
        date: item.extracted_date,
        published_at: item.published_at,
        is_roundup: item.is_roundup,
        sub_items: item.sub_items.clone(),
    }
}

fn section_item(item: &NormalizedItem) -> SectionItem {
    SectionItem {
        id: item.id.clone(),
        title: item.title.clone(),
        link: item.link.clone(),
        start: item.extracted_date.map(|d| d.start),
        end: item.extracted_date.and_then(|d| d.end),
        published_at: item.published_at,
        is_roundup: item.is_roundup,
    }
}
