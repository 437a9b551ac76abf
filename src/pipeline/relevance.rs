//! Keyword relevance filter.
//!
//! Layers, in order: negative vocabulary (roundups exempt), forward-looking
//! score, category positives for planner categories, and a location gate for
//! alerts and civic news.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use regex::Regex;

use crate::models::{Category, NormalizedItem};

use super::keywords::{positive_keywords, FORWARD_SIGNALS, NEGATIVE_GROUPS};

/// Key in the user keyword map that holds extra negative keywords.
pub const NEGATIVE_KEY: &str = "negative";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLayer {
    Negative,
    PositiveSignal,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relevance {
    pub relevant: bool,
    pub forward_score: u32,
    pub dropped_by: Option<FilterLayer>,
    /// The keyword that triggered a negative drop.
    pub matched: Option<String>,
}

/// Keyword matcher with a lazily filled cache of word-boundary patterns.
///
/// Single words are matched on word boundaries ("preview" never matches
/// "review"); phrases containing whitespace use plain containment. Cached
/// patterns are never replaced once inserted.
#[derive(Debug, Default)]
pub struct KeywordMatcher {
    patterns: RwLock<HashMap<String, Arc<Regex>>>,
}

impl KeywordMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `text` is expected to be lower-cased already.
    pub fn matches(&self, text: &str, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return false;
        }
        if keyword.contains(char::is_whitespace) {
            return text.contains(&keyword);
        }
        match self.pattern(&keyword) {
            Some(pattern) => pattern.is_match(text),
            None => text.contains(&keyword),
        }
    }

    pub fn first_match<'a, I>(&self, text: &str, keywords: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keywords
            .into_iter()
            .find(|k| self.matches(text, k))
            .map(str::to_string)
    }

    pub fn cached_patterns(&self) -> usize {
        self.patterns.read().map(|p| p.len()).unwrap_or(0)
    }

    fn pattern(&self, keyword: &str) -> Option<Arc<Regex>> {
        if let Ok(cache) = self.patterns.read() {
            if let Some(pattern) = cache.get(keyword) {
                return Some(Arc::clone(pattern));
            }
        }

        let compiled = Arc::new(Regex::new(&boundary_pattern(keyword)).ok()?);
        match self.patterns.write() {
            Ok(mut cache) => Some(Arc::clone(
                cache
                    .entry(keyword.to_string())
                    .or_insert_with(|| Arc::clone(&compiled)),
            )),
            Err(_) => Some(compiled),
        }
    }
}

/// `\b` is only meaningful next to word characters, so keywords like `% off`
/// or `disney+` only get a boundary on their alphanumeric side.
pub(crate) fn boundary_pattern(keyword: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let head = if keyword.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let tail = if keyword.chars().last().is_some_and(is_word) { r"\b" } else { "" };
    format!("{}{}{}", head, regex::escape(keyword), tail)
}

#[derive(Debug, Default)]
pub struct RelevanceFilter {
    matcher: KeywordMatcher,
}

impl RelevanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    pub fn is_relevant(
        &self,
        item: &NormalizedItem,
        keywords: &BTreeMap<String, Vec<String>>,
        locations: &[String],
    ) -> bool {
        self.evaluate(item, keywords, locations).relevant
    }

    pub fn evaluate(
        &self,
        item: &NormalizedItem,
        keywords: &BTreeMap<String, Vec<String>>,
        locations: &[String],
    ) -> Relevance {
        let text = item.search_text();

        if !item.is_roundup {
            if let Some(hit) = self.negative_hit(&text, keywords) {
                return Relevance {
                    relevant: false,
                    forward_score: 0,
                    dropped_by: Some(FilterLayer::Negative),
                    matched: Some(hit),
                };
            }
        }

        let forward_score = self.forward_score(&text);

        if item.category.is_planner_category()
            && forward_score == 0
            && !self.has_positive(&text, item.category, keywords)
        {
            return Relevance {
                relevant: false,
                forward_score,
                dropped_by: Some(FilterLayer::PositiveSignal),
                matched: None,
            };
        }

        if item.category.requires_location() && !mentions_location(&text, locations) {
            return Relevance {
                relevant: false,
                forward_score,
                dropped_by: Some(FilterLayer::Location),
                matched: None,
            };
        }

        Relevance {
            relevant: true,
            forward_score,
            dropped_by: None,
            matched: None,
        }
    }

    /// Number of forward-looking vocabulary entries present in `text`.
    pub fn forward_score(&self, text: &str) -> u32 {
        FORWARD_SIGNALS
            .iter()
            .filter(|signal| self.matcher.matches(text, signal))
            .count() as u32
    }

    fn negative_hit(&self, text: &str, keywords: &BTreeMap<String, Vec<String>>) -> Option<String> {
        let built_in = NEGATIVE_GROUPS.iter().flat_map(|(_, words)| words.iter().copied());
        let user = keywords
            .get(NEGATIVE_KEY)
            .into_iter()
            .flat_map(|words| words.iter().map(String::as_str));
        self.matcher.first_match(text, built_in.chain(user))
    }

    fn has_positive(
        &self,
        text: &str,
        category: Category,
        keywords: &BTreeMap<String, Vec<String>>,
    ) -> bool {
        let user = keywords
            .get(category.as_str())
            .into_iter()
            .flat_map(|words| words.iter().map(String::as_str));
        self.matcher
            .first_match(text, positive_keywords(category).iter().copied().chain(user))
            .is_some()
    }
}

fn mentions_location(text: &str, locations: &[String]) -> bool {
    locations
        .iter()
        .map(|l| l.trim().to_lowercase())
        .any(|l| !l.is_empty() && text.contains(&l))
}
