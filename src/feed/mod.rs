mod fetcher;

pub use fetcher::{parse_items, sources_from_config, FeedFetcher, FeedSource};
