use std::collections::{BTreeSet, HashSet};

use crate::models::PlannerRecord;

/// Titles scoring above this are treated as the same event.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// First-occurrence-wins id set for a single batch.
#[derive(Debug, Default)]
pub struct BatchDedup {
    seen: HashSet<String>,
}

impl BatchDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time `id` is offered, `false` afterwards.
    pub fn insert(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

fn word_set(title: &str) -> BTreeSet<String> {
    title
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Jaccard similarity of the two titles' word sets.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

pub fn is_duplicate(existing: &[PlannerRecord], id: &str, title: &str) -> bool {
    existing
        .iter()
        .any(|r| r.id == id || title_similarity(&r.title, title) > SIMILARITY_THRESHOLD)
}
