//! Raw feed record to `NormalizedItem`: markup stripping, identity, date
//! extraction, classification and roundup detection.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::models::{NormalizedItem, RawFeedItem, SubItem};

use super::classifier::classify;
use super::dates;
use super::keywords::PLATFORMS;
use super::relevance::boundary_pattern;

const MAX_SUB_ITEMS: usize = 20;
const RENDER_WIDTH: usize = 1000;

static ROUNDUP_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d+\s+new\b").expect("roundup pattern must compile"));

static ROUNDUP_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:releases?|releasing|week|weekend)\b").expect("roundup pattern must compile")
});

static FOOTNOTE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[\d+\]:.*$").expect("footnote pattern must compile"));

static FOOTNOTE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\[\d+\]").expect("footnote pattern must compile"));

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[*\-•#>]+|\d{1,2}[.)])\s*").expect("bullet pattern must compile")
});

static PLATFORM_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PLATFORMS
        .iter()
        .filter_map(|(key, name)| Regex::new(&format!("(?i){}", boundary_pattern(key))).ok().map(|re| (re, *name)))
        .collect()
});

/// Turns one raw record into a structured item. `reference` is today's date.
pub fn normalize(raw: &RawFeedItem, reference: NaiveDate) -> NormalizedItem {
    let title = collapse_whitespace(&strip_markup(&raw.title));
    let body = strip_markup(&raw.description);
    let description = collapse_whitespace(&body);

    let extracted_date =
        dates::extract(&title, reference).or_else(|| dates::extract(&description, reference));
    let category = classify(&format!("{} {}", title, description));
    let is_roundup = is_roundup_title(&title);
    let sub_items = if is_roundup {
        extract_sub_items(&body, reference)
    } else {
        Vec::new()
    };

    NormalizedItem {
        id: item_id(raw),
        title,
        description,
        link: raw.link.trim().to_string(),
        published_at: raw.published_at.as_deref().and_then(parse_published),
        extracted_date,
        category,
        is_roundup,
        sub_items,
        forward_score: 0,
    }
}

/// `guid`, then `link`, then `title`: the first that is not blank.
pub fn item_id(raw: &RawFeedItem) -> String {
    [raw.guid.as_deref(), Some(raw.link.as_str()), Some(raw.title.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Markup-free text with line structure kept.
pub fn strip_markup(input: &str) -> String {
    if !input.contains('<') && !input.contains('&') {
        return input.to_string();
    }
    let rendered = match html2text::from_read(input.as_bytes(), RENDER_WIDTH) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("Failed to convert HTML to text: {}", e);
            return input.to_string();
        }
    };
    let without_notes = FOOTNOTE_LINE_RE.replace_all(&rendered, "");
    let without_refs = FOOTNOTE_REF_RE.replace_all(&without_notes, "$1");
    without_refs
        .lines()
        .map(|l| l.replace("**", "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A count like "8 new" next to "releases"/"week"/"weekend" in the title.
pub fn is_roundup_title(title: &str) -> bool {
    ROUNDUP_COUNT_RE.is_match(title) && ROUNDUP_CONTEXT_RE.is_match(title)
}

/// Lines of a roundup body that name a platform, one sub-item each.
pub fn extract_sub_items(body: &str, reference: NaiveDate) -> Vec<SubItem> {
    body.split(['\n', '•', ';', '|'])
        .map(|segment| BULLET_RE.replace(segment.trim(), "").trim().to_string())
        .filter(|segment| segment.len() >= 3)
        .filter_map(|segment| {
            let (pattern, platform) = PLATFORM_PATTERNS.iter().find(|(re, _)| re.is_match(&segment))?;
            let title = sub_item_title(&segment, pattern)?;
            Some(SubItem {
                title,
                date: dates::extract(&segment, reference).map(|d| d.start),
                platform: platform.to_string(),
            })
        })
        .take(MAX_SUB_ITEMS)
        .collect()
}

fn sub_item_title(segment: &str, platform: &Regex) -> Option<String> {
    let head = segment
        .split([':', '(', '–', '—'])
        .next()
        .unwrap_or(segment)
        .split(" - ")
        .next()
        .unwrap_or(segment);
    // "Title on Netflix" style lines
    let head = platform
        .find(head)
        .map(|m| &head[..m.start()])
        .unwrap_or(head)
        .trim()
        .trim_end_matches(" on")
        .trim_end_matches(" in")
        .trim_end_matches(',')
        .trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

pub fn parse_published(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}
