//! Event date extraction.
//!
//! Five lexical layers are tried in a fixed order and the first hit wins:
//! ISO/numeric, named, range, relative and deadline. The order matters
//! because the patterns overlap; a written-out date always beats a loose
//! "tomorrow" elsewhere in the same text.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::{Captures, Regex};

use crate::models::{DateKind, ExtractedDate};

/// Upper bound on the number of day keys a single item may expand to.
pub const MAX_EXPANDED_DAYS: usize = 14;

/// A date without a year may sit at most this far in the past.
const PAST_WINDOW_DAYS: i64 = 30;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec";
const ORDINAL: &str = r"(?:st|nd|rd|th)?";
const CONNECTOR: &str = r"\s*(?:to|through|till|until|-|–|—)\s*";
const DEADLINE_ANCHOR: &str =
    r"\b(?:ends?|ending|last date|deadline|valid till|valid until|expires?|before)\b(?:\s+(?:on|is|by))?\s*:?\s*";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("date pattern must compile")
}

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:\D|$)"));

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4})\b"));

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}}){ORDINAL}\b(?:,?\s+(\d{{4}})\b)?"
    ))
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(\d{{1,2}}){ORDINAL}\s+(?:of\s+)?({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
});

static MONTH_DAY_AT_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)^({MONTHS})\.?\s+(\d{{1,2}}){ORDINAL}\b(?:,?\s+(\d{{4}})\b)?"
    ))
});

static DAY_MONTH_AT_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)^(\d{{1,2}}){ORDINAL}\s+(?:of\s+)?({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
});

/// `March 5 to March 8`
static RANGE_MONTH_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}}){ORDINAL}{CONNECTOR}({MONTHS})\.?\s+(\d{{1,2}}){ORDINAL}\b(?:,?\s+(\d{{4}})\b)?"
    ))
});

/// `March 5 to 8`
static RANGE_MONTH_SAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}}){ORDINAL}{CONNECTOR}(\d{{1,2}}){ORDINAL}\b(?:,?\s+(\d{{4}})\b)?"
    ))
});

/// `5 March to 8 March`
static RANGE_DAY_MONTH_BOTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(\d{{1,2}}){ORDINAL}\s+({MONTHS})\b\.?{CONNECTOR}(\d{{1,2}}){ORDINAL}\s+({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
});

/// `5 to 8 March`
static RANGE_DAYS_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)\b(\d{{1,2}}){ORDINAL}{CONNECTOR}(\d{{1,2}}){ORDINAL}\s+(?:of\s+)?({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
});

static DEADLINE_HEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i){DEADLINE_ANCHOR}$")));

static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| compile(&format!(r"(?i){DEADLINE_ANCHOR}")));

static DAY_WORD_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(today|tonight|tomorrow)\b"));

static NEXT_N_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\bnext\s+(\d{1,2})\s+(days?|weeks?)\b"));

static NEXT_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bnext\s+week\b"));

static WEEKEND_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(?:this|coming)\s+weekend\b"));

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:this|next|coming)\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
});

/// Best-effort event date for `text`, relative to `reference` (normally today).
pub fn extract(text: &str, reference: NaiveDate) -> Option<ExtractedDate> {
    extract_numeric(text)
        .or_else(|| extract_named(text, reference))
        .or_else(|| extract_range(text, reference))
        .or_else(|| extract_relative(text, reference))
        .or_else(|| extract_deadline(text, reference))
}

/// Day keys (`YYYY-MM-DD`) covered by `date`, at most `max_days` of them.
pub fn expand_date_keys(date: &ExtractedDate, max_days: usize) -> Vec<String> {
    let last = date.last_day().max(date.start);
    let mut keys = Vec::new();
    let mut day = date.start;
    while day <= last && keys.len() < max_days {
        keys.push(day_key(day));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    keys
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn extract_numeric(text: &str) -> Option<ExtractedDate> {
    let iso = ISO_RE.captures_iter(text).find_map(|caps| {
        ymd(&caps, 1, 2, 3).map(|d| ExtractedDate::single(d, DateKind::Iso))
    });
    iso.or_else(|| {
        NUMERIC_RE.captures_iter(text).find_map(|caps| {
            ymd(&caps, 3, 2, 1).map(|d| ExtractedDate::single(d, DateKind::Numeric))
        })
    })
}

fn extract_named(text: &str, reference: NaiveDate) -> Option<ExtractedDate> {
    let mut candidates: Vec<(usize, usize, NaiveDate)> = Vec::new();

    for caps in MONTH_DAY_RE.captures_iter(text) {
        let whole = caps.get(0)?;
        if let Some(date) = named_date(&caps, 1, 2, 3, reference) {
            candidates.push((whole.start(), whole.end(), date));
        }
    }
    for caps in DAY_MONTH_RE.captures_iter(text) {
        let whole = caps.get(0)?;
        if let Some(date) = named_date(&caps, 2, 1, 3, reference) {
            candidates.push((whole.start(), whole.end(), date));
        }
    }
    candidates.sort_by_key(|(start, _, _)| *start);

    // ends of a parsed range belong to the range layer
    let range_span = find_range(text, reference).map(|(start, end, _)| (start, end));
    candidates
        .into_iter()
        .find(|(start, end, _)| {
            let in_range = range_span.is_some_and(|(from, to)| *start < to && *end > from);
            !in_range && !DEADLINE_HEAD_RE.is_match(&text[..*start])
        })
        .map(|(_, _, date)| ExtractedDate::single(date, DateKind::Named))
}

fn extract_range(text: &str, reference: NaiveDate) -> Option<ExtractedDate> {
    find_range(text, reference).map(|(_, _, range)| range)
}

/// First range construction that resolves, with its byte span in `text`.
/// Only the two-month forms may cross a year boundary.
fn find_range(text: &str, reference: NaiveDate) -> Option<(usize, usize, ExtractedDate)> {
    let forms: [(&Regex, (usize, usize), (usize, usize), usize, bool); 4] = [
        (&*RANGE_MONTH_MONTH_RE, (1, 2), (3, 4), 5, true),
        (&*RANGE_DAY_MONTH_BOTH_RE, (2, 1), (4, 3), 5, true),
        (&*RANGE_MONTH_SAME_RE, (1, 2), (1, 3), 4, false),
        (&*RANGE_DAYS_MONTH_RE, (3, 1), (3, 2), 4, false),
    ];
    forms.iter().find_map(|(pattern, start, end, year, crosses_year)| {
        pattern.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            range_from(&caps, *start, *end, *year, reference, *crosses_year)
                .map(|range| (whole.start(), whole.end(), range))
        })
    })
}

fn extract_relative(text: &str, reference: NaiveDate) -> Option<ExtractedDate> {
    let mut candidates: Vec<(usize, ExtractedDate)> = Vec::new();

    for caps in DAY_WORD_RE.captures_iter(text) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let date = if word.as_str().eq_ignore_ascii_case("tomorrow") {
            reference + Duration::days(1)
        } else {
            reference
        };
        candidates.push((whole.start(), ExtractedDate::single(date, DateKind::Relative)));
    }

    for caps in NEXT_N_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let count: i64 = match caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            Some(n) if n > 0 => n,
            _ => continue,
        };
        let unit = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        let days = if unit.starts_with("week") { count * 7 } else { count };
        candidates.push((
            whole.start(),
            ExtractedDate::span(reference, reference + Duration::days(days), DateKind::Relative),
        ));
    }

    if let Some(whole) = NEXT_WEEK_RE.find(text) {
        let to_monday = 7 - i64::from(reference.weekday().num_days_from_monday());
        let monday = reference + Duration::days(to_monday);
        candidates.push((
            whole.start(),
            ExtractedDate::span(monday, monday + Duration::days(6), DateKind::Relative),
        ));
    }

    if let Some(whole) = WEEKEND_RE.find(text) {
        candidates.push((whole.start(), upcoming_weekend(reference)));
    }

    for caps in WEEKDAY_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(weekday) = caps.get(1).and_then(|m| m.as_str().to_lowercase().parse::<Weekday>().ok())
        else {
            continue;
        };
        candidates.push((
            whole.start(),
            ExtractedDate::single(next_weekday(reference, weekday), DateKind::Relative),
        ));
    }

    candidates
        .into_iter()
        .min_by_key(|(position, _)| *position)
        .map(|(_, date)| date)
}

fn extract_deadline(text: &str, reference: NaiveDate) -> Option<ExtractedDate> {
    DEADLINE_RE.find_iter(text).find_map(|anchor| {
        let rest = &text[anchor.end()..];
        let end = MONTH_DAY_AT_START_RE
            .captures(rest)
            .and_then(|caps| named_date(&caps, 1, 2, 3, reference))
            .or_else(|| {
                DAY_MONTH_AT_START_RE
                    .captures(rest)
                    .and_then(|caps| named_date(&caps, 2, 1, 3, reference))
            })?;
        Some(ExtractedDate::span(reference, end, DateKind::Deadline))
    })
}

/// Next occurrence of `weekday` strictly after `reference`.
fn next_weekday(reference: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = i64::from(reference.weekday().num_days_from_monday());
    let target = i64::from(weekday.num_days_from_monday());
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    reference + Duration::days(ahead)
}

fn upcoming_weekend(reference: NaiveDate) -> ExtractedDate {
    match reference.weekday() {
        Weekday::Sat => ExtractedDate::span(reference, reference + Duration::days(1), DateKind::Relative),
        Weekday::Sun => ExtractedDate::single(reference, DateKind::Relative),
        other => {
            let saturday = reference + Duration::days(5 - i64::from(other.num_days_from_monday()));
            ExtractedDate::span(saturday, saturday + Duration::days(1), DateKind::Relative)
        }
    }
}

fn month_number(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    let prefix = token.get(..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn capture_u32(caps: &Captures, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn ymd(caps: &Captures, year: usize, month: usize, day: usize) -> Option<NaiveDate> {
    let year: i32 = caps.get(year)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, capture_u32(caps, month)?, capture_u32(caps, day)?)
}

fn named_date(
    caps: &Captures,
    month: usize,
    day: usize,
    year: usize,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    let month = month_number(caps.get(month)?.as_str())?;
    let day = capture_u32(caps, day)?;
    match caps.get(year).and_then(|m| m.as_str().parse::<i32>().ok()) {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => infer_year(month, day, reference),
    }
}

/// Earliest of last year, this year and next year that is not more than
/// `PAST_WINDOW_DAYS` behind `reference`.
fn infer_year(month: u32, day: u32, reference: NaiveDate) -> Option<NaiveDate> {
    let earliest = reference - Duration::days(PAST_WINDOW_DAYS);
    (reference.year() - 1..=reference.year() + 1)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|date| *date >= earliest)
}

/// A trailing year belongs to the end date; the start is derived from it.
fn range_from(
    caps: &Captures,
    start: (usize, usize),
    end: (usize, usize),
    year: usize,
    reference: NaiveDate,
    crosses_year: bool,
) -> Option<ExtractedDate> {
    let start_month = month_number(caps.get(start.0)?.as_str())?;
    let start_day = capture_u32(caps, start.1)?;
    let end_month = month_number(caps.get(end.0)?.as_str())?;
    let end_day = capture_u32(caps, end.1)?;

    let (first, last) = match caps.get(year).and_then(|m| m.as_str().parse::<i32>().ok()) {
        Some(year) => {
            let last = NaiveDate::from_ymd_opt(year, end_month, end_day)?;
            let mut first = NaiveDate::from_ymd_opt(year, start_month, start_day)?;
            if first > last {
                if !crosses_year {
                    return None;
                }
                first = NaiveDate::from_ymd_opt(year - 1, start_month, start_day)?;
            }
            (first, last)
        }
        None => {
            let first = infer_year(start_month, start_day, reference)?;
            let mut last = NaiveDate::from_ymd_opt(first.year(), end_month, end_day)?;
            if last < first {
                // "Jan 20 - 7 PM" is a time, not a day
                if !crosses_year {
                    return None;
                }
                last = NaiveDate::from_ymd_opt(first.year() + 1, end_month, end_day)?;
            }
            (first, last)
        }
    };
    Some(ExtractedDate::span(first, last, DateKind::Range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Wednesday
    fn wednesday() -> NaiveDate {
        date(2026, 1, 14)
    }

    #[test]
    fn iso_and_numeric_dates_keep_their_year() {
        let got = extract("Registrations close 2024-03-05 at noon", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::single(date(2024, 3, 5), DateKind::Iso));

        let got = extract("Screening on 05/03/2027", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::single(date(2027, 3, 5), DateKind::Numeric));

        let got = extract("Screening on 05-03-2027", wednesday()).unwrap();
        assert_eq!(got.start, date(2027, 3, 5));
    }

    #[test]
    fn invalid_numeric_date_falls_through() {
        assert_eq!(extract("ref 2026-13-45 tomorrow", wednesday()).map(|d| d.kind), Some(DateKind::Relative));
    }

    #[test]
    fn explicit_year_overrides_inference() {
        let got = extract("The expo ran on March 5, 2024", date(2026, 1, 10)).unwrap();
        assert_eq!(got.start, date(2024, 3, 5));
        assert_eq!(got.kind, DateKind::Named);

        let got = extract("Concert on 20 Dec 2031", date(2026, 1, 10)).unwrap();
        assert_eq!(got.start, date(2031, 12, 20));
    }

    #[test]
    fn year_is_inferred_within_past_window() {
        let reference = date(2026, 1, 10);
        assert_eq!(extract("event on March 5", reference).unwrap().start, date(2026, 3, 5));
        assert_eq!(extract("event on Dec 20", reference).unwrap().start, date(2025, 12, 20));
        assert_eq!(extract("event on 5th of March", reference).unwrap().start, date(2026, 3, 5));
    }

    #[test]
    fn month_names_do_not_match_inside_words() {
        assert_eq!(extract("marching 5 bands and decorations", wednesday()), None);
        assert_eq!(extract("Decemberists play 12 songs", wednesday()), None);
    }

    #[test]
    fn numeric_date_wins_over_relative_anchor() {
        let got = extract("Tomorrow we announce the 2026-02-01 lineup", wednesday()).unwrap();
        assert_eq!(got.kind, DateKind::Iso);
        assert_eq!(got.start, date(2026, 2, 1));
    }

    #[test]
    fn ranges_produce_start_and_end() {
        let got = extract("Flower show March 5 to March 8", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::span(date(2026, 3, 5), date(2026, 3, 8), DateKind::Range));

        let got = extract("Book fair Mar 5-8 at the grounds", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::span(date(2026, 3, 5), date(2026, 3, 8), DateKind::Range));

        let got = extract("Fest runs 5 to 8 March", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::span(date(2026, 3, 5), date(2026, 3, 8), DateKind::Range));
    }

    #[test]
    fn range_crossing_new_year_rolls_end_forward() {
        let got = extract("Carnival Dec 28 through Jan 3", date(2026, 12, 1)).unwrap();
        assert_eq!(got.start, date(2026, 12, 28));
        assert_eq!(got.end, Some(date(2027, 1, 3)));
    }

    #[test]
    fn trailing_year_belongs_to_the_range_end() {
        let got = extract("Carnival Dec 28 – Jan 3, 2027", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::span(date(2026, 12, 28), date(2027, 1, 3), DateKind::Range));

        let got = extract("Expo March 5 to 8, 2027", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::span(date(2027, 3, 5), date(2027, 3, 8), DateKind::Range));
    }

    #[test]
    fn clock_time_after_a_dash_is_not_a_range_end() {
        let got = extract("Carnatic concert Jan 20 - 7 PM at Music Academy", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::single(date(2026, 1, 20), DateKind::Named));

        let got = extract("Concert on March 5 - 6pm at the arena", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::single(date(2026, 3, 5), DateKind::Named));

        assert_eq!(extract("Fair 20 to 7 March", wednesday()).map(|d| d.kind), Some(DateKind::Named));
    }

    #[test]
    fn number_before_a_dash_does_not_hide_the_date() {
        let got = extract("Season 2 - Jan 20 premiere on Netflix", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::single(date(2026, 1, 20), DateKind::Named));
    }

    #[test]
    fn relative_anchors_resolve_against_reference() {
        let today = wednesday();
        assert_eq!(extract("Power cut tomorrow", today).unwrap().start, date(2026, 1, 15));
        assert_eq!(extract("Gig tonight at 9", today).unwrap().start, today);
        assert_eq!(extract("Open mic this Friday", today).unwrap().start, date(2026, 1, 16));
        assert_eq!(extract("Quiz next Wednesday", today).unwrap().start, date(2026, 1, 21));

        let week = extract("Roadworks next week", today).unwrap();
        assert_eq!((week.start, week.end), (date(2026, 1, 19), Some(date(2026, 1, 25))));

        let span = extract("Rain likely for the next 3 days", today).unwrap();
        assert_eq!((span.start, span.end), (today, Some(date(2026, 1, 17))));
    }

    #[test]
    fn weekend_is_the_upcoming_saturday_and_sunday() {
        let got = extract("Food walk this weekend", wednesday()).unwrap();
        assert_eq!((got.start, got.end), (date(2026, 1, 17), Some(date(2026, 1, 18))));

        let saturday = date(2026, 1, 10);
        let got = extract("Food walk this weekend", saturday).unwrap();
        assert_eq!((got.start, got.end), (saturday, Some(date(2026, 1, 11))));
    }

    #[test]
    fn earliest_relative_anchor_wins() {
        let got = extract("Tomorrow and this Saturday too", wednesday()).unwrap();
        assert_eq!(got.start, date(2026, 1, 15));
    }

    #[test]
    fn deadline_spans_from_reference_to_date() {
        let got = extract("Mega sale ends January 20", wednesday()).unwrap();
        assert_eq!(got, ExtractedDate::span(wednesday(), date(2026, 1, 20), DateKind::Deadline));

        let got = extract("Offer valid till 25th Jan", wednesday()).unwrap();
        assert_eq!(got.kind, DateKind::Deadline);
        assert_eq!(got.end, Some(date(2026, 1, 25)));
    }

    #[test]
    fn expands_day_keys_with_cap() {
        let range = ExtractedDate::span(date(2026, 1, 30), date(2026, 2, 2), DateKind::Range);
        assert_eq!(
            expand_date_keys(&range, MAX_EXPANDED_DAYS),
            vec!["2026-01-30", "2026-01-31", "2026-02-01", "2026-02-02"]
        );

        let runaway = ExtractedDate::span(date(2026, 1, 1), date(2026, 6, 1), DateKind::Range);
        assert_eq!(expand_date_keys(&runaway, MAX_EXPANDED_DAYS).len(), 14);

        let backwards = ExtractedDate::span(date(2026, 1, 5), date(2026, 1, 1), DateKind::Range);
        assert_eq!(expand_date_keys(&backwards, MAX_EXPANDED_DAYS), vec!["2026-01-05"]);
    }
}
