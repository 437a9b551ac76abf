use chrono::{DateTime, Duration, NaiveDate, Utc};

use whatson::app::App;
use whatson::config::{Config, Settings};
use whatson::db::PlannerStore;
use whatson::models::{Category, DateKind, RawFeedItem};
use whatson::pipeline::{normalize, Aggregator, ReferenceTime};

fn reference() -> ReferenceTime {
    let now = DateTime::parse_from_rfc3339("2026-01-14T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    ReferenceTime::at(now)
}

fn hours_ago(hours: i64) -> String {
    (reference().now - Duration::hours(hours)).to_rfc3339()
}

fn raw(title: &str, link: &str, published_hours_ago: i64) -> RawFeedItem {
    RawFeedItem {
        title: title.to_string(),
        description: String::new(),
        link: link.to_string(),
        published_at: Some(hours_ago(published_hours_ago)),
        guid: None,
    }
}

fn chennai_settings() -> Settings {
    serde_json::from_str(r#"{"categories": {"alerts": true}, "locations": ["Chennai"]}"#).unwrap()
}

async fn app(settings: Settings) -> App {
    let config = Config {
        settings,
        ..Config::default()
    };
    let store = PlannerStore::open_in_memory().await.unwrap();
    App::with_store(&config, store)
}

#[tokio::test]
async fn power_cut_lands_in_tomorrows_bucket() {
    let input = format!(
        r#"[{{"title": "Chennai power cut scheduled tomorrow in Adyar", "description": "", "publishedAt": "{}"}}]"#,
        hours_ago(2)
    );
    let items: Vec<RawFeedItem> = serde_json::from_str(&input).unwrap();

    let normalized = normalize(&items[0], reference().today);
    assert_eq!(normalized.category, Category::Alerts);
    let date = normalized.extracted_date.unwrap();
    assert_eq!(date.kind, DateKind::Relative);
    assert_eq!(date.start, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());

    let app = app(chennai_settings()).await;
    let report = app.run_batch(&items, reference()).await;

    let tomorrow = report.digest.day("2026-01-15").expect("tomorrow bucket");
    assert_eq!(tomorrow.label, "Tomorrow");
    assert_eq!(tomorrow.items.len(), 1);
    assert_eq!(tomorrow.items[0].title, "Chennai power cut scheduled tomorrow in Adyar");
    assert_eq!(report.digest.sections[&Category::Alerts].len(), 1);
    assert_eq!(report.stats.kept, 1);

    // dated survivors reach the planner
    assert_eq!(report.planned, 1);
    let planner = app.planner(reference()).await.unwrap();
    assert_eq!(planner["2026-01-15"][0].title, "Chennai power cut scheduled tomorrow in Adyar");
}

#[tokio::test]
async fn freshness_overrides_apply_per_category() {
    let items = vec![
        raw("Heavy rain alert for Chennai", "https://example.com/rain", 7),
        raw("Chennai water supply suspended in Anna Nagar", "https://example.com/water", 10),
    ];
    let app = app(chennai_settings()).await;
    let report = app.run_batch(&items, reference()).await;

    assert_eq!(report.stats.unfresh, 1);
    assert_eq!(report.stats.kept, 1);
    let today = report.digest.day("2026-01-14").expect("today bucket");
    assert_eq!(today.label, "Today");
    assert_eq!(today.items[0].link, "https://example.com/water");
    assert!(report.digest.sections[&Category::WeatherAlerts].is_empty());
}

#[tokio::test]
async fn preview_survives_where_review_is_dropped() {
    let items = vec![
        raw("Kaathal movie preview screening this Friday", "https://example.com/preview", 1),
        raw("Kaathal movie review: a tender drama", "https://example.com/review", 1),
    ];
    let app = app(Settings::default()).await;
    let report = app.run_batch(&items, reference()).await;

    assert_eq!(report.stats.negative, 1);
    assert_eq!(report.stats.kept, 1);
    let friday = report.digest.day("2026-01-16").expect("friday bucket");
    assert_eq!(friday.label, "Friday");
    assert_eq!(friday.items[0].link, "https://example.com/preview");
    assert_eq!(report.digest.weekly_plan.get("Friday").map(|i| i.len()), Some(1));
}

#[tokio::test]
async fn off_location_alerts_are_dropped() {
    let items = vec![raw("Pune power cut scheduled tomorrow", "https://example.com/pune", 1)];
    let app = app(chennai_settings()).await;
    let report = app.run_batch(&items, reference()).await;

    assert_eq!(report.stats.location, 1);
    assert!(report.digest.timeline.is_empty());
    assert_eq!(report.planned, 0);
}

#[test]
fn aggregation_is_idempotent() {
    let batch = vec![
        raw("Chennai power cut scheduled tomorrow in Adyar", "https://example.com/a", 2),
        raw("Upcoming jazz concert on January 18, tickets open", "https://example.com/b", 3),
        raw("8 new releases this week on OTT", "https://example.com/c", 4),
        raw("Book fair from Jan 10 to Jan 20 at YMCA grounds", "https://example.com/d", 5),
        raw("Chennai metro services suspended for maintenance", "https://example.com/e", 1),
    ];
    let settings = Settings {
        locations: vec!["Chennai".to_string()],
        ..Settings::default()
    };
    let aggregator = Aggregator::new();

    let run = || {
        let items = batch.iter().map(|r| normalize(r, reference().today)).collect();
        let digest = aggregator.aggregate(items, &settings, reference()).digest;
        (
            serde_json::to_string(&digest.timeline).unwrap(),
            serde_json::to_string(&digest.sections).unwrap(),
            serde_json::to_string(&digest.weekly_plan).unwrap(),
        )
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(first.0.contains("jazz concert"));
}
