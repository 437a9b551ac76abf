use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

/// One record as handed over by the fetch layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, alias = "publishedAt", alias = "pubDate")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub guid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateKind {
    Iso,
    Numeric,
    Named,
    Range,
    Relative,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDate {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub kind: DateKind,
}

impl ExtractedDate {
    pub fn single(start: NaiveDate, kind: DateKind) -> Self {
        Self {
            start,
            end: None,
            kind,
        }
    }

    pub fn span(start: NaiveDate, end: NaiveDate, kind: DateKind) -> Self {
        Self {
            start,
            end: Some(end),
            kind,
        }
    }

    /// Last day the event is still on.
    pub fn last_day(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItem {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub platform: String,
}

#[derive(Debug, Clone)]
pub struct NormalizedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub extracted_date: Option<ExtractedDate>,
    pub category: Category,
    pub is_roundup: bool,
    pub sub_items: Vec<SubItem>,
    pub forward_score: u32,
}

impl NormalizedItem {
    /// Lower-cased title and description, the text every keyword layer runs against.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}
