use std::time::Duration;

use feed_rs::parser;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::models::RawFeedItem;

const LOCATION_PLACEHOLDER: &str = "{location}";
const QUERY_PLACEHOLDER: &str = "{query}";

/// Where a batch of raw records comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// An RSS/Atom feed fetched as-is.
    Url(String),
    /// A search phrase run through the configured search feed.
    Query(String),
}

/// Feed URLs first, then queries with `{location}` expanded per location.
pub fn sources_from_config(config: &Config) -> Vec<FeedSource> {
    let feeds = config.feeds.iter().cloned().map(FeedSource::Url);
    let queries = config.queries.iter().flat_map(|query| {
        if query.contains(LOCATION_PLACEHOLDER) {
            config
                .settings
                .locations
                .iter()
                .map(|location| FeedSource::Query(query.replace(LOCATION_PLACEHOLDER, location)))
                .collect::<Vec<_>>()
        } else {
            vec![FeedSource::Query(query.clone())]
        }
    });
    feeds.chain(queries).collect()
}

pub struct FeedFetcher {
    client: Client,
    search_url_template: String,
    concurrency: usize,
}

impl FeedFetcher {
    pub fn new(timeout: Duration, search_url_template: String, concurrency: usize) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("whatson/1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            search_url_template,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_secs(config.fetch_timeout_secs),
            config.search_url_template.clone(),
            config.max_concurrent_fetches,
        )
    }

    pub fn source_url(&self, source: &FeedSource) -> Result<Url> {
        let raw = match source {
            FeedSource::Url(url) => url.clone(),
            FeedSource::Query(query) => self
                .search_url_template
                .replace(QUERY_PLACEHOLDER, &urlencoding::encode(query)),
        };
        let url = Url::parse(&raw)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("Unsupported feed scheme: {}", url.scheme()).into());
        }
        Ok(url)
    }

    pub async fn fetch_source(&self, source: &FeedSource) -> Result<Vec<RawFeedItem>> {
        let url = self.source_url(source)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        parse_items(&bytes)
    }

    /// Fetches every source with bounded concurrency. A failing source is
    /// logged and contributes nothing; output keeps source order.
    pub async fn fetch_all(&self, sources: Vec<FeedSource>) -> Vec<RawFeedItem> {
        let batches: Vec<Vec<RawFeedItem>> = stream::iter(sources)
            .map(|source| async move {
                match self.fetch_source(&source).await {
                    Ok(items) => {
                        tracing::debug!("Fetched {} items from {:?}", items.len(), source);
                        items
                    }
                    Err(e) => {
                        tracing::warn!("Failed to fetch {:?}: {}", source, e);
                        Vec::new()
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        batches.into_iter().flatten().collect()
    }
}

/// RSS/Atom bytes to raw records.
pub fn parse_items(bytes: &[u8]) -> Result<Vec<RawFeedItem>> {
    let feed = parser::parse(bytes)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            // summary first, then full content
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            RawFeedItem {
                title: entry.title.map(|t| t.content).unwrap_or_default(),
                description,
                link: entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default(),
                published_at: entry.published.or(entry.updated).map(|dt| dt.to_rfc3339()),
                guid: Some(entry.id).filter(|id| !id.trim().is_empty()),
            }
        })
        .collect();

    Ok(items)
}
