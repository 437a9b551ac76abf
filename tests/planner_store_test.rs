use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use whatson::db::PlannerStore;
use whatson::models::{Category, DateKind, ExtractedDate, PlannerEntry, PlannerRecord};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 1, 14)
}

fn entry(id: &str, title: &str, date: ExtractedDate) -> PlannerEntry {
    PlannerEntry {
        record: PlannerRecord {
            id: id.to_string(),
            title: title.to_string(),
            category: Category::Events,
            link: format!("https://example.com/{}", id),
            added_at: Utc::now(),
        },
        date,
    }
}

fn on(day: NaiveDate) -> ExtractedDate {
    ExtractedDate::single(day, DateKind::Named)
}

#[tokio::test]
async fn similar_titles_are_stored_once_per_day() {
    let store = PlannerStore::open_in_memory().await.unwrap();
    let saturday = date(2026, 1, 17);

    let added = store
        .merge(
            vec![
                entry("a", "City Concert This Weekend", on(saturday)),
                entry("b", "City Concert this Weekend!!", on(saturday)),
            ],
            today(),
        )
        .await
        .unwrap();

    assert_eq!(added, 1);
    let day = store.day("2026-01-17", today()).await.unwrap();
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].id, "a");
}

#[tokio::test]
async fn same_id_is_not_added_twice() {
    let store = PlannerStore::open_in_memory().await.unwrap();
    let friday = date(2026, 1, 16);

    store.merge(vec![entry("a", "Jazz night", on(friday))], today()).await.unwrap();
    let added = store
        .merge(vec![entry("a", "Completely different title", on(friday))], today())
        .await
        .unwrap();

    assert_eq!(added, 0);
    assert_eq!(store.day("2026-01-16", today()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ranges_expand_to_every_day() {
    let store = PlannerStore::open_in_memory().await.unwrap();
    let fair = ExtractedDate::span(date(2026, 1, 16), date(2026, 1, 18), DateKind::Range);

    let added = store.merge(vec![entry("fair", "Book fair", fair)], today()).await.unwrap();

    assert_eq!(added, 3);
    let planner = store.load(today()).await.unwrap();
    assert_eq!(
        planner.keys().cloned().collect::<Vec<_>>(),
        vec!["2026-01-16", "2026-01-17", "2026-01-18"]
    );
}

#[tokio::test]
async fn old_days_are_pruned_on_read() {
    let store = PlannerStore::open_in_memory().await.unwrap();
    let early = date(2026, 1, 2);
    store
        .merge(
            vec![
                entry("old", "New year brunch", on(date(2026, 1, 3))),
                entry("recent", "Pongal market", on(date(2026, 1, 8))),
            ],
            early,
        )
        .await
        .unwrap();

    let planner = store.load(today()).await.unwrap();
    assert!(!planner.contains_key("2026-01-03"));
    assert!(planner.contains_key("2026-01-08"));

    // nothing left to prune once the read has written back
    assert_eq!(store.prune(today()).await.unwrap(), 0);
}

#[tokio::test]
async fn remove_and_clear() {
    let store = PlannerStore::open_in_memory().await.unwrap();
    let friday = date(2026, 1, 16);
    store
        .merge(
            vec![entry("a", "Jazz night", on(friday)), entry("b", "Comedy special", on(friday))],
            today(),
        )
        .await
        .unwrap();

    assert!(store.remove("2026-01-16", "a", today()).await.unwrap());
    assert!(!store.remove("2026-01-16", "a", today()).await.unwrap());
    assert!(!store.remove("2026-01-20", "b", today()).await.unwrap());
    assert_eq!(store.day("2026-01-16", today()).await.unwrap()[0].id, "b");

    store.clear().await.unwrap();
    assert!(store.load(today()).await.unwrap().is_empty());
}

#[tokio::test]
async fn planner_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.db");
    let path = path.to_string_lossy().to_string();

    {
        let store = PlannerStore::open(&path).await.unwrap();
        store
            .merge(vec![entry("a", "Jazz night", on(date(2026, 1, 16)))], today())
            .await
            .unwrap();
    }

    let store = PlannerStore::open(&path).await.unwrap();
    let planner = store.load(today()).await.unwrap();
    assert_eq!(planner["2026-01-16"][0].title, "Jazz night");
}

#[tokio::test]
async fn concurrent_merges_keep_every_record() {
    let store = Arc::new(PlannerStore::open_in_memory().await.unwrap());
    let friday = date(2026, 1, 16);

    let tasks: Vec<_> = ["Jazz night", "Stand-up comedy special", "Pottery workshop", "Farmers market"]
        .into_iter()
        .enumerate()
        .map(|(i, title)| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .merge(vec![entry(&i.to_string(), title, on(friday))], today())
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.day("2026-01-16", today()).await.unwrap().len(), 4);
}

#[test]
fn works_outside_a_multi_threaded_runtime() {
    tokio_test::block_on(async {
        let store = PlannerStore::open_in_memory().await.unwrap();
        store
            .merge(vec![entry("a", "Jazz night", on(date(2026, 1, 16)))], today())
            .await
            .unwrap();
        assert_eq!(store.load(today()).await.unwrap().len(), 1);
    });
}
