use crate::models::Category;

use super::keywords::CATEGORY_RULES;

/// First category group with a substring hit, or `General`.
///
/// Plain substring containment; word boundaries are left to the relevance
/// filter. Several groups carry leading or trailing spaces, so the text is
/// padded before matching.
pub fn classify(text: &str) -> Category {
    let padded = format!(" {} ", text.to_lowercase());
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| padded.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utility_alert_wins_over_everything_else() {
        assert_eq!(
            classify("Chennai power cut scheduled tomorrow in Adyar"),
            Category::Alerts
        );
        // "show" and "movie" would also match later groups
        assert_eq!(
            classify("Power outage cancels movie show at Sathyam"),
            Category::Alerts
        );
    }

    #[test]
    fn weather_warning_comes_before_events() {
        assert_eq!(
            classify("Orange alert: heavy rain likely during the music fest"),
            Category::WeatherAlerts
        );
    }

    #[test]
    fn sports_shows_are_sports() {
        assert_eq!(classify("CSK vs MI match tickets on sale"), Category::Sports);
        assert_eq!(classify("Comedy show at the Music Academy"), Category::Events);
    }

    #[test]
    fn padding_lets_leading_terms_match_at_start() {
        assert_eq!(classify("IPL final moved to Sunday"), Category::Sports);
        assert_eq!(classify("Multiple tweets about nothing"), Category::General);
    }

    #[test]
    fn festivals_shopping_and_civic() {
        assert_eq!(classify("Pongal celebrations at Dakshinachitra"), Category::Festivals);
        assert_eq!(classify("Mega clearance sale at Pondy Bazaar"), Category::Shopping);
        assert_eq!(classify("Transport strike called for Monday"), Category::Civic);
    }

    #[test]
    fn generic_alert_fallback_and_general() {
        assert_eq!(classify("Advisory issued for beach visitors"), Category::Alerts);
        assert_eq!(classify("Local library gets new books"), Category::General);
    }
}
