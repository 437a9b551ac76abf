use crate::config::{Config, Settings};
use crate::db::PlannerStore;
use crate::error::Result;
use crate::feed::{sources_from_config, FeedFetcher, FeedSource};
use crate::models::{Digest, PlannerMap, RawFeedItem};
use crate::pipeline::{normalize, Aggregator, ReferenceTime, StageStats};

/// Outcome of one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub digest: Digest,
    pub stats: StageStats,
    /// Records added to the planner; zero when persistence failed.
    pub planned: usize,
}

pub struct App {
    pub settings: Settings,
    sources: Vec<FeedSource>,
    fetcher: FeedFetcher,
    aggregator: Aggregator,
    store: PlannerStore,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let store = match PlannerStore::open(&config.db_path).await {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(
                    "Failed to open planner at {}: {}; using an in-memory planner",
                    config.db_path,
                    e
                );
                PlannerStore::open_in_memory().await?
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: &Config, store: PlannerStore) -> Self {
        Self {
            settings: config.settings.clone(),
            sources: sources_from_config(config),
            fetcher: FeedFetcher::from_config(config),
            aggregator: Aggregator::new(),
            store,
        }
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    /// Fetches every configured source and runs the result as one batch.
    pub async fn refresh(&self) -> BatchReport {
        let reference = ReferenceTime::local_now();
        let raw = self.fetcher.fetch_all(self.sources.clone()).await;
        tracing::info!("Fetched {} raw items from {} sources", raw.len(), self.sources.len());
        self.run_batch(&raw, reference).await
    }

    /// Normalize, aggregate, then merge dated survivors into the planner.
    /// Planner failures are logged and never fail the batch.
    pub async fn run_batch(&self, raw: &[RawFeedItem], reference: ReferenceTime) -> BatchReport {
        let items = raw
            .iter()
            .map(|item| normalize(item, reference.today))
            .collect();
        let aggregation = self.aggregator.aggregate(items, &self.settings, reference);

        let planned = match self
            .store
            .merge(aggregation.planner_candidates, reference.today)
            .await
        {
            Ok(added) => added,
            Err(e) => {
                tracing::warn!("Failed to update planner: {}", e);
                0
            }
        };

        BatchReport {
            digest: aggregation.digest,
            stats: aggregation.stats,
            planned,
        }
    }

    pub async fn planner(&self, reference: ReferenceTime) -> Result<PlannerMap> {
        self.store.load(reference.today).await
    }

    pub async fn prune(&self, reference: ReferenceTime) -> Result<usize> {
        self.store.prune(reference.today).await
    }

    pub async fn clear_planner(&self) -> Result<()> {
        self.store.clear().await
    }

    pub async fn remove_planned(&self, date_key: &str, id: &str, reference: ReferenceTime) -> Result<bool> {
        self.store.remove(date_key, id, reference.today).await
    }
}
