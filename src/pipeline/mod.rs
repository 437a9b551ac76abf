pub mod aggregator;
pub mod classifier;
pub mod dates;
pub mod dedup;
pub mod freshness;
pub mod keywords;
pub mod normalizer;
pub mod relevance;

pub use aggregator::{Aggregation, Aggregator, ReferenceTime, StageStats};
pub use classifier::classify;
pub use dedup::{is_duplicate, title_similarity, BatchDedup};
pub use freshness::{FreshnessGate, Staleness};
pub use normalizer::normalize;
pub use relevance::{FilterLayer, KeywordMatcher, Relevance, RelevanceFilter};
