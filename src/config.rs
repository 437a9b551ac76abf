use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};
use crate::models::Category;
use crate::pipeline::freshness::DEFAULT_MAX_AGE_HOURS;

const APP_DIR: &str = "whatson";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Feed URLs fetched as-is.
    #[serde(default)]
    pub feeds: Vec<String>,

    /// Search phrases; `{location}` expands once per configured location.
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,

    /// Feed URL for a search query; `{query}` is replaced with the encoded query.
    #[serde(default = "default_search_url_template")]
    pub search_url_template: String,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub settings: Settings,
}

/// User preferences that shape one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Category enable flags; missing categories are enabled.
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub categories: BTreeMap<Category, bool>,

    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    #[serde(default = "default_hide_older_than_hours", alias = "hideOlderThanHours")]
    pub hide_older_than_hours: u32,

    /// Extra positive keywords per category name, plus `negative`.
    #[serde(default)]
    pub keywords: BTreeMap<String, Vec<String>>,
}

/// Unknown category names are skipped with a warning instead of failing the file.
fn deserialize_categories<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<Category, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, enabled)| match name.parse::<Category>() {
            Ok(category) => Some((category, enabled)),
            Err(e) => {
                tracing::warn!("Ignoring category setting: {}", e);
                None
            }
        })
        .collect())
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("planner.db").to_string_lossy().to_string()
}

fn default_queries() -> Vec<String> {
    vec![
        "{location} events this weekend".to_string(),
        "{location} power cut".to_string(),
        "{location} traffic diversion".to_string(),
        "new movie releases this week".to_string(),
    ]
}

fn default_search_url_template() -> String {
    "https://news.google.com/rss/search?q={query}&hl=en-IN&gl=IN&ceid=IN:en".to_string()
}

fn default_max_concurrent_fetches() -> usize {
    5
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_locations() -> Vec<String> {
    ["Chennai", "Bengaluru", "Mumbai", "Delhi", "Hyderabad"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_hide_older_than_hours() -> u32 {
    DEFAULT_MAX_AGE_HOURS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            locations: default_locations(),
            hide_older_than_hours: default_hide_older_than_hours(),
            keywords: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn is_enabled(&self, category: Category) -> bool {
        self.categories.get(&category).copied().unwrap_or(true)
    }

    /// Settings handed over as JSON by another component.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            feeds: Vec::new(),
            queries: default_queries(),
            search_url_template: default_search_url_template(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.max_concurrent_fetches == 0 {
            return Err(AppError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }
}
