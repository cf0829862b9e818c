//! Commands against the in-memory sample archive

use oparl_data::{Archive, ArchiveConfig, NO_VALUE, NO_VALUES};
use oparl_filter::FilterDimension;
use oparl_viewer::commands::{self, SearchAction, Settings, TableRequest};
use oparl_test_utils::{sample_archive, BASE_URL};
use pretty_assertions::assert_eq;

fn archive() -> Archive {
    Archive::new(
        ArchiveConfig::default().with_base_url(BASE_URL),
        sample_archive().fetcher(),
    )
}

fn references(report: &commands::TableReport) -> Vec<&str> {
    report.rows.iter().map(|row| row.reference.as_str()).collect()
}

#[tokio::test]
async fn facets_follow_control_order() {
    let facets = commands::facets(&archive()).await;

    let dimensions: Vec<_> = facets.iter().map(|(dimension, _)| *dimension).collect();
    assert_eq!(dimensions, FilterDimension::ALL.to_vec());
    assert_eq!(facets[0].1, vec!["2024", "2019"]);
    assert_eq!(facets[2].1, vec!["Gemeinderat", "Hauptverwaltung", NO_VALUES]);
    assert_eq!(facets[3].1, vec!["Entscheidung", NO_VALUE]);
    assert_eq!(facets[5].1, vec!["Durlach", "Oststadt"]);

    let text = commands::format_facets(&facets);
    assert!(text.starts_with("Jahr (2):\n  2024\n  2019\n"));
}

#[tokio::test]
async fn unfiltered_table_reveals_one_batch() {
    let request = TableRequest {
        batch_size: 2,
        ..TableRequest::default()
    };
    let report = commands::table(&archive(), &request).await.unwrap();

    assert_eq!(references(&report), vec!["2019/0042", "2024/0815"]);
    assert_eq!(report.total_matching, 3);
    assert!(report.has_more);
    assert_eq!(report.count_text, "");
    assert_eq!(report.rows[0].date_group, "2025-03-03");
}

#[tokio::test]
async fn further_pages_reveal_the_rest() {
    let request = TableRequest {
        batch_size: 2,
        pages: 5,
        ..TableRequest::default()
    };
    let report = commands::table(&archive(), &request).await.unwrap();

    assert_eq!(references(&report), vec!["2019/0042", "2024/0815", "2024/0816"]);
    assert!(!report.has_more);
}

#[tokio::test]
async fn year_filter_updates_count_and_url() {
    let request = TableRequest {
        filters: vec![(FilterDimension::Year, "2024".to_string())],
        ..TableRequest::default()
    };
    let report = commands::table(&archive(), &request).await.unwrap();

    assert_eq!(references(&report), vec!["2024/0815", "2024/0816"]);
    assert_eq!(report.count_text, "2 von 3 Vorlagen");
    assert_eq!(report.url, "http://localhost/vorlagen?jahr=2024");

    let text = commands::format_table(&report);
    assert!(text.contains("2 von 3 Vorlagen"));
    assert!(!text.contains("--pages"));
}

#[tokio::test]
async fn district_filter_is_membership() {
    let request = TableRequest {
        filters: vec![(FilterDimension::Stadtteil, "Oststadt".to_string())],
        ..TableRequest::default()
    };
    let report = commands::table(&archive(), &request).await.unwrap();

    assert_eq!(references(&report), vec!["2024/0815"]);
    assert_eq!(report.rows[0].result, "beschlossen");
}

#[tokio::test]
async fn paper_detail_resolves_references() {
    let detail = commands::paper_detail(&archive(), "2024-0815").await.unwrap();

    assert_eq!(detail.reference, "2024/0815");
    assert_eq!(detail.organizations, vec!["Gemeinderat"]);
    assert_eq!(detail.districts, vec!["Durlach", "Oststadt"]);

    let results: Vec<_> = detail
        .consultations
        .iter()
        .map(|line| line.result.as_deref())
        .collect();
    assert_eq!(results, vec![Some("verwiesen"), Some("beschlossen")]);

    assert_eq!(detail.files[0].text, "available");
    assert_eq!(detail.files[0].text_chars, Some("Haushaltsplan 2025".chars().count()));
    assert_eq!(detail.files[1].text, "absent");
    assert!(detail.to_text().starts_with("Vorlage 2024/0815 (2024/0815)\n"));
}

#[tokio::test]
async fn unknown_slug_is_an_error() {
    let err = commands::paper_detail(&archive(), "2023-0100").await.unwrap_err();
    assert!(err.to_string().contains("unknown paper reference"));
}

#[tokio::test]
async fn preload_report_is_readable() {
    let report = archive().preload_all_contents().await;
    assert_eq!(
        commands::format_chunk_report(&report),
        "1 chunks loaded, 1 texts merged: complete, chunk 1 does not exist"
    );
}

#[test]
fn flags_override_file_and_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.toml");
    std::fs::write(&path, "base_url = \"https://file.example.org\"\nchunk_batch_size = 8\n").unwrap();

    let settings = Settings {
        config_path: Some(path),
        base_url: Some("https://flag.example.org".to_string()),
        max_chunks: Some(3),
        ..Settings::default()
    };
    let env = |key: &str| (key == "OPARL_CHUNK_BATCH_SIZE").then(|| "4".to_string());
    let config = commands::load_config(&settings, env).unwrap();

    assert_eq!(config.base_url, "https://flag.example.org");
    assert_eq!(config.chunk_batch_size, 4);
    assert_eq!(config.max_chunks, Some(3));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.toml");
    std::fs::write(&path, "chunk_batch_size = 0\n").unwrap();

    let settings = Settings {
        config_path: Some(path),
        ..Settings::default()
    };
    let err = commands::load_config(&settings, |_| None).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));
}

#[test]
fn saved_searches_command() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("searches.json");

    let out = commands::saved_searches(&storage, "/", &SearchAction::List);
    assert_eq!(out, "Noch keine Suche gespeichert.\n");

    let out = commands::saved_searches(&storage, "/", &SearchAction::Save("Radweg  Durlach".into()));
    assert_eq!(
        out,
        "Suche gespeichert: \"Radweg Durlach\"\n1 gespeicherte Suchanfrage\n  Radweg Durlach </suche?q=Radweg+Durlach>\n"
    );

    let out = commands::saved_searches(&storage, "/", &SearchAction::Clear);
    assert_eq!(out, "Noch keine Suche gespeichert.\n");
}

#[test]
fn search_status_without_index_in_dev() {
    let dir = tempfile::tempdir().unwrap();
    let status = commands::search_status(None, true, Some(dir.path()));
    assert!(!status.enabled);
    assert!(commands::search_status(None, false, None).enabled);
}
