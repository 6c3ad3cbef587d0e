//! History store behaviour over both the in-memory and the file-backed store.

use chrono::{Duration, TimeZone, Utc};
use pagepulse_core::AnalysisResult;
use pagepulse_store::{
    FileStore, HistoryFilter, HistorySort, HistoryStore, KeyValueStore, MemoryStore,
    HISTORY_CAPACITY, HISTORY_STORAGE_KEY,
};

fn scored(url: &str, score: u8) -> AnalysisResult {
    AnalysisResult::scored(url, score)
}

#[test]
fn empty_store_has_no_history() {
    let history = HistoryStore::new(MemoryStore::new());
    assert!(history.entries().unwrap().is_empty());
    assert!(!history.contains_url("https://a.test").unwrap());
    assert_eq!(history.stats().unwrap().total, 0);
}

#[test]
fn record_prepends_newest_entry() {
    let history = HistoryStore::new(MemoryStore::new());
    history.record(&scored("https://a.test", 70)).unwrap();
    history.record(&scored("https://b.test", 80)).unwrap();

    let urls: Vec<String> = history
        .entries()
        .unwrap()
        .into_iter()
        .map(|e| e.result.url)
        .collect();
    assert_eq!(urls, vec!["https://b.test", "https://a.test"]);
}

#[test]
fn record_keeps_one_entry_per_url() {
    let history = HistoryStore::new(MemoryStore::new());
    history.record(&scored("https://a.test", 40)).unwrap();
    history.record(&scored("https://b.test", 60)).unwrap();
    let latest = history.record(&scored("https://a.test", 95)).unwrap();

    let entries = history.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, latest.id);
    assert_eq!(entries[0].result.score(), Some(95));
    assert_eq!(entries[1].result.url, "https://b.test");
}

#[test]
fn history_is_capped() {
    let history = HistoryStore::new(MemoryStore::new());
    for i in 0..=HISTORY_CAPACITY {
        history
            .record(&scored(&format!("https://site{i}.test"), 50))
            .unwrap();
    }

    let entries = history.entries().unwrap();
    assert_eq!(entries.len(), HISTORY_CAPACITY);
    assert_eq!(
        entries[0].result.url,
        format!("https://site{HISTORY_CAPACITY}.test")
    );
    assert!(!history.contains_url("https://site0.test").unwrap());
}

#[test]
fn clear_removes_everything() {
    let store = MemoryStore::new();
    store.set("other", "kept").unwrap();
    let history = HistoryStore::new(store);
    history.record(&scored("https://a.test", 70)).unwrap();
    history.clear().unwrap();
    assert!(history.entries().unwrap().is_empty());
}

#[test]
fn corrupt_history_reads_as_empty_and_is_replaced_on_record() {
    let store = MemoryStore::new();
    store.set(HISTORY_STORAGE_KEY, "{ definitely not an array").unwrap();
    let history = HistoryStore::new(store);

    assert!(history.entries().unwrap().is_empty());
    history.record(&scored("https://a.test", 70)).unwrap();
    assert_eq!(history.entries().unwrap().len(), 1);
}

#[test]
fn unique_urls_in_recency_order() {
    let history = HistoryStore::new(MemoryStore::new());
    history.record(&scored("https://a.test", 70)).unwrap();
    history.record(&scored("https://b.test", 70)).unwrap();
    history.record(&AnalysisResult::failed("https://c.test")).unwrap();

    assert_eq!(
        history.unique_urls().unwrap(),
        vec!["https://c.test", "https://b.test", "https://a.test"]
    );
    assert!(history.contains_url("https://b.test").unwrap());
}

#[test]
fn query_filters_by_band_and_sorts() {
    let history = HistoryStore::new(MemoryStore::new());
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    history.record_at(&scored("https://c.test", 92), base).unwrap();
    history
        .record_at(&scored("https://a.test", 55), base + Duration::hours(1))
        .unwrap();
    history
        .record_at(&scored("https://b.test", 30), base + Duration::hours(2))
        .unwrap();
    history
        .record_at(&AnalysisResult::failed("https://d.test"), base - Duration::hours(1))
        .unwrap();

    let urls = |filter, sort| -> Vec<String> {
        history
            .query(filter, sort)
            .unwrap()
            .into_iter()
            .map(|e| e.result.url)
            .collect()
    };

    assert_eq!(
        urls(HistoryFilter::All, HistorySort::Date),
        vec!["https://b.test", "https://a.test", "https://c.test", "https://d.test"]
    );
    assert_eq!(
        urls(HistoryFilter::All, HistorySort::Score),
        vec!["https://c.test", "https://a.test", "https://b.test", "https://d.test"]
    );
    assert_eq!(
        urls(HistoryFilter::All, HistorySort::Url),
        vec!["https://a.test", "https://b.test", "https://c.test", "https://d.test"]
    );
    assert_eq!(urls(HistoryFilter::Good, HistorySort::Date), vec!["https://c.test"]);
    assert_eq!(urls(HistoryFilter::Average, HistorySort::Date), vec!["https://a.test"]);
    assert_eq!(urls(HistoryFilter::Poor, HistorySort::Date), vec!["https://b.test"]);
}

#[test]
fn stats_over_history() {
    let history = HistoryStore::new(MemoryStore::new());
    history.record(&scored("https://a.test", 93)).unwrap();
    history.record(&scored("https://b.test", 42)).unwrap();
    history.record(&AnalysisResult::failed("https://c.test")).unwrap();

    let stats = history.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 3);
    assert!((stats.average_score - 67.5).abs() < f64::EPSILON);
    assert_eq!((stats.good, stats.average, stats.poor), (1, 0, 1));
}

#[test]
fn filter_and_sort_parse_from_cli_words() {
    assert_eq!("poor".parse::<HistoryFilter>().unwrap(), HistoryFilter::Poor);
    assert_eq!("url".parse::<HistorySort>().unwrap(), HistorySort::Url);
    assert!("excellent".parse::<HistoryFilter>().is_err());
    assert!("name".parse::<HistorySort>().is_err());
}

#[test]
fn file_backed_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    HistoryStore::new(FileStore::new(&path))
        .record(&scored("https://a.test", 88))
        .unwrap();

    let reopened = HistoryStore::new(FileStore::new(&path));
    let entries = reopened.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].result.score(), Some(88));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.get(HISTORY_STORAGE_KEY).is_some());
}

#[test]
fn corrupt_storage_file_reads_as_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "[1, 2").unwrap();

    let history = HistoryStore::new(FileStore::new(&path));
    assert!(history.entries().unwrap().is_empty());
    history.record(&scored("https://a.test", 70)).unwrap();
    assert_eq!(history.entries().unwrap().len(), 1);
}

fn record_from_threads(history: &HistoryStore, threads: usize, per_thread: usize) {
    std::thread::scope(|scope| {
        for thread in 0..threads {
            scope.spawn(move || {
                for n in 0..per_thread {
                    history
                        .record(&scored(&format!("https://t{thread}-{n}.test"), 75))
                        .unwrap();
                }
            });
        }
    });
}

#[test]
fn concurrent_records_are_not_lost() {
    let history = HistoryStore::new(MemoryStore::new());
    record_from_threads(&history, 8, 10);

    let urls = history.unique_urls().unwrap();
    assert_eq!(urls.len(), 80);
    assert!(history.contains_url("https://t0-0.test").unwrap());
    assert!(history.contains_url("https://t7-9.test").unwrap());
}

#[test]
fn concurrent_records_are_not_lost_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryStore::new(FileStore::new(dir.path().join("storage.json")));
    record_from_threads(&history, 4, 5);

    let reopened = HistoryStore::new(FileStore::new(dir.path().join("storage.json")));
    assert_eq!(reopened.entries().unwrap().len(), 20);
}
