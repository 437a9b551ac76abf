use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Movies,
    Events,
    Festivals,
    Alerts,
    Sports,
    Shopping,
    Civic,
    WeatherAlerts,
    General,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Movies,
        Category::Events,
        Category::Festivals,
        Category::Alerts,
        Category::Sports,
        Category::Shopping,
        Category::Civic,
        Category::WeatherAlerts,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "movies",
            Category::Events => "events",
            Category::Festivals => "festivals",
            Category::Alerts => "alerts",
            Category::Sports => "sports",
            Category::Shopping => "shopping",
            Category::Civic => "civic",
            Category::WeatherAlerts => "weather_alerts",
            Category::General => "general",
        }
    }

    /// Categories whose items must carry a positive keyword or a forward-looking signal.
    pub fn is_planner_category(&self) -> bool {
        matches!(
            self,
            Category::Movies | Category::Events | Category::Sports | Category::Shopping
        )
    }

    /// Alerts imply immediacy and never need an extracted date.
    pub fn is_alert(&self) -> bool {
        matches!(self, Category::Alerts | Category::WeatherAlerts)
    }

    pub fn requires_location(&self) -> bool {
        matches!(self, Category::Alerts | Category::Civic)
    }

    /// Per-category cap on item age, tighter or looser than the user setting.
    pub fn max_age_override_hours(&self) -> Option<u32> {
        match self {
            Category::WeatherAlerts => Some(6),
            Category::Alerts => Some(12),
            Category::Festivals => Some(336),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}
