use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::{Category, ExtractedDate, SubItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub category: Category,
    pub date: Option<ExtractedDate>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_roundup: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<SubItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineDay {
    pub date_key: String,
    pub label: String,
    pub items: Vec<TimelineItem>,
}

/// Trimmed-down record for the "worth knowing" lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_roundup: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDay {
    pub day: String,
    pub date_key: String,
    pub items: Vec<TimelineItem>,
}

/// The next seven days, today first. Serialized as a day-name keyed object in walk order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeeklyPlan {
    pub days: Vec<PlanDay>,
}

impl WeeklyPlan {
    pub fn get(&self, day: &str) -> Option<&[TimelineItem]> {
        self.days
            .iter()
            .find(|d| d.day == day)
            .map(|d| d.items.as_slice())
    }
}

impl Serialize for WeeklyPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for day in &self.days {
            map.serialize_entry(&day.day, &day.items)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    pub timeline: Vec<TimelineDay>,
    pub sections: BTreeMap<Category, Vec<SectionItem>>,
    pub weekly_plan: WeeklyPlan,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

impl Digest {
    pub fn day(&self, date_key: &str) -> Option<&TimelineDay> {
        self.timeline.iter().find(|d| d.date_key == date_key)
    }
}
