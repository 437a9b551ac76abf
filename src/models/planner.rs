use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, ExtractedDate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRecord {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub link: String,
    pub added_at: DateTime<Utc>,
}

/// Day key (`YYYY-MM-DD`) to the records planned on that day.
pub type PlannerMap = BTreeMap<String, Vec<PlannerRecord>>;

/// A surviving item waiting to be merged into the planner.
#[derive(Debug, Clone)]
pub struct PlannerEntry {
    pub record: PlannerRecord,
    pub date: ExtractedDate,
}
