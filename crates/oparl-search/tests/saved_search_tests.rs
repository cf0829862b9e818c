//! Saved searches end to end: file-backed storage, control, list page

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use oparl_filter::{
    FilterDimension, History, MemoryHistory, MemoryTable, PapersTable, RowAttributes,
    TableOptions, YEAR_QUERY_PARAM,
};
use oparl_search::{
    build_saved_search_url, query_from_url, CountBadge, EmptyReason, FileStorage,
    MemorySearchIndex, SaveOutcome, SavedSearchControl, SavedSearchList, SearchStorage,
    MAX_SAVED_SEARCHES, SAVED_SEARCH_QUERY_PARAM,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).unwrap()
}

fn file_storage(dir: &tempfile::TempDir) -> Arc<dyn SearchStorage> {
    Arc::new(FileStorage::open(dir.path().join("local-storage.json")).unwrap())
}

#[test]
fn saved_searches_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut control = SavedSearchControl::new(Some(file_storage(&dir)));
    for (query, i) in ["Radweg", "Schule", "radweg"].into_iter().zip(0_i64..) {
        control.set_query(query);
        control.save(now() + TimeDelta::seconds(i));
    }

    let list = SavedSearchList::open(Some(file_storage(&dir)), "/", true);
    let queries: Vec<_> = list.searches().iter().map(|s| s.query.as_str()).collect();
    assert_eq!(queries, vec!["radweg", "Schule"]);
    assert_eq!(list.summary(), "2 gespeicherte Suchanfragen");
    assert_eq!(list.items()[0].href, "/suche?q=radweg");
    assert_eq!(list.items()[0].remove_label, "Suche \"radweg\" entfernen");
}

#[test]
fn list_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let mut control = SavedSearchControl::new(Some(file_storage(&dir)));
    for i in 0..30 {
        control.set_query(&format!("Anfrage {i}"));
        assert!(matches!(control.save(now() + TimeDelta::seconds(i)), SaveOutcome::Saved(_)));
    }

    assert_eq!(control.searches().len(), MAX_SAVED_SEARCHES);
    assert_eq!(control.searches()[0].query, "Anfrage 29");
    assert_eq!(control.link_label(), "Gespeicherte Suchen (25)");
}

#[test]
fn remove_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let mut control = SavedSearchControl::new(Some(file_storage(&dir)));
    for query in ["Radweg", "Schule"] {
        control.set_query(query);
        control.save(now());
    }

    let mut list = SavedSearchList::open(Some(file_storage(&dir)), "/", true);
    assert!(list.remove("RADWEG"));
    assert!(!list.remove("Radweg"));
    assert_eq!(list.summary(), "1 gespeicherte Suchanfrage");

    assert!(!list.clear(false));
    assert!(list.can_clear());
    assert!(list.clear(true));
    assert_eq!(list.empty_reason(), Some(EmptyReason::Cleared));
    assert_eq!(list.summary(), "0 gespeicherte Suchanfragen");

    let reopened = SavedSearchList::open(Some(file_storage(&dir)), "/", true);
    assert_eq!(reopened.empty_reason(), Some(EmptyReason::NothingSaved));
}

#[tokio::test]
async fn result_counts_are_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut control = SavedSearchControl::new(Some(file_storage(&dir)));
    for (query, i) in ["Radweg", "Schule", "Haushalt"].into_iter().zip(0_i64..) {
        control.set_query(query);
        control.save(now() + TimeDelta::seconds(i));
    }
    let index = MemorySearchIndex::new()
        .with_count("radweg", 1)
        .with_count("schule", 12)
        .with_failure("haushalt");

    let list = SavedSearchList::open(Some(file_storage(&dir)), "/", true);
    let badges = list.result_counts(&index).await;
    assert_eq!(
        badges,
        vec![CountBadge::Unavailable, CountBadge::Count(12), CountBadge::Count(1)]
    );
    assert_eq!(badges[2].to_string(), "1 Treffer");
}

#[tokio::test]
async fn disabled_search_skips_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let mut control = SavedSearchControl::new(Some(file_storage(&dir)));
    control.set_query("Radweg");
    control.save(now());

    let index = MemorySearchIndex::new().with_count("radweg", 4);
    let list = SavedSearchList::open(Some(file_storage(&dir)), "/", false);
    assert_eq!(list.result_counts(&index).await, vec![CountBadge::Unavailable]);
    assert!(index.requests().is_empty());
}

#[test]
fn search_and_year_parameters_do_not_collide() {
    assert_ne!(SAVED_SEARCH_QUERY_PARAM, YEAR_QUERY_PARAM);

    let href = build_saved_search_url("https://archiv.example.org/", "Radweg Durlach");
    let rows = vec![RowAttributes {
        date_group: "2024-01-01".to_string(),
        year: "2024".to_string(),
        paper_type: "Antrag".to_string(),
        ..RowAttributes::default()
    }];
    let dom = MemoryTable::new(rows).with_controls_from_rows();
    let mut table =
        PapersTable::init(dom, MemoryHistory::new(href), TableOptions::default()).unwrap();
    table.set_filter(FilterDimension::Year, Some("2024"));

    let written = table.history().href();
    assert_eq!(query_from_url(&written, SAVED_SEARCH_QUERY_PARAM), "Radweg Durlach");
    assert_eq!(query_from_url(&written, YEAR_QUERY_PARAM), "2024");
}
