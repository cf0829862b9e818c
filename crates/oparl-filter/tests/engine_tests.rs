//! Engine properties over larger tables

use oparl_filter::{
    FilterDimension, History, MemoryHistory, MemoryTable, PapersTable, RowAttributes, TableDom,
    TableOptions,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const PAGE: &str = "https://archiv.example.org/vorlagen?ansicht=liste";

fn row(year: &str, paper_type: &str, district: &str) -> RowAttributes {
    RowAttributes {
        date_group: format!("{year}-01-01"),
        year: year.to_string(),
        paper_type: paper_type.to_string(),
        organization: "Gemeinderat".to_string(),
        role: "Entscheidung".to_string(),
        result: "beschlossen".to_string(),
        stadtteile: district.to_string(),
    }
}

/// 2023: 3 rows, 2024: 5 rows
fn two_years() -> Vec<RowAttributes> {
    let mut rows = vec![row("2024", "Antrag", "Durlach"); 5];
    rows.extend(vec![row("2023", "Antrag", "Oststadt"); 3]);
    rows
}

fn attach(
    rows: Vec<RowAttributes>,
    href: &str,
    batch: usize,
) -> PapersTable<MemoryTable, MemoryHistory> {
    let dom = MemoryTable::new(rows).with_controls_from_rows();
    let mut table = PapersTable::init(
        dom,
        MemoryHistory::new(href),
        TableOptions::default().with_batch_size(batch),
    )
    .unwrap();
    table.on_animation_frame();
    table
}

#[test]
fn year_filter_caps_and_hides_trigger() {
    let mut table = attach(two_years(), PAGE, 2);

    table.set_filter(FilterDimension::Year, Some("2023"));
    assert_eq!(table.total_matching(), 3);
    assert_eq!(table.visible_rows().len(), 2);
    assert!(!table.dom().load_trigger_hidden());

    table.load_next_rows().unwrap();
    assert_eq!(table.visible_rows(), &[5, 6, 7]);
    assert!(table.dom().load_trigger_hidden());
    assert_eq!(table.dom().count_text(), "3 von 8 Vorlagen");
}

#[test]
fn secondary_filter_keeps_year_candidates() {
    let mut rows = two_years();
    rows[6].paper_type = "Anfrage".to_string();
    let mut table = attach(rows, PAGE, 10);

    table.set_filter(FilterDimension::Year, Some("2023"));
    table.set_filter(FilterDimension::Type, Some("Anfrage"));
    assert_eq!(table.visible_rows(), &[6]);

    table.set_filter(FilterDimension::Type, None);
    assert_eq!(table.visible_rows(), &[5, 6, 7]);
    assert_eq!(table.state().year.as_deref(), Some("2023"));
}

#[test]
fn only_changed_rows_are_written() {
    let mut table = attach(two_years(), PAGE, 10);
    table.dom_mut().reset_row_mutations();

    table.set_filter(FilterDimension::Year, Some("2023"));
    assert_eq!(table.dom().row_mutations(), 5);

    table.dom_mut().reset_row_mutations();
    table.set_filter(FilterDimension::Year, Some("2023"));
    assert_eq!(table.dom().row_mutations(), 0);

    table.set_filter(FilterDimension::Year, None);
    assert_eq!(table.dom().row_mutations(), 5);
}

#[test]
fn district_filter_is_membership() {
    let mut rows = two_years();
    rows[0].stadtteile = "Durlach|Oststadt".to_string();
    let mut table = attach(rows, PAGE, 10);

    table.set_filter(FilterDimension::Stadtteil, Some("Oststadt"));
    assert_eq!(table.visible_rows(), &[0, 5, 6, 7]);
}

#[test]
fn missing_district_control_disables_the_dimension() {
    let dom = MemoryTable::new(two_years())
        .with_controls_from_rows()
        .without_control(FilterDimension::Stadtteil);
    let mut table = PapersTable::init(dom, MemoryHistory::new(PAGE), TableOptions::default())
        .unwrap();
    table.on_animation_frame();

    let pass = table.set_filter(FilterDimension::Stadtteil, Some("Oststadt"));
    assert_eq!(pass.matching, 8);
    assert_eq!(table.dom().count_text(), "");
}

#[test]
fn year_is_written_to_the_url() {
    let mut table = attach(two_years(), PAGE, 10);

    table.set_filter(FilterDimension::Year, Some("2024"));
    table.set_filter(FilterDimension::Year, None);

    assert_eq!(
        table.history().replacements(),
        &[
            "https://archiv.example.org/vorlagen?ansicht=liste&jahr=2024".to_string(),
            "https://archiv.example.org/vorlagen?ansicht=liste".to_string(),
        ]
    );
}

#[test]
fn unset_year_removes_the_query_entirely() {
    let mut table = attach(two_years(), "https://archiv.example.org/vorlagen?jahr=2024", 10);
    assert_eq!(table.state().year.as_deref(), Some("2024"));

    table.set_filter(FilterDimension::Year, Some(""));
    assert_eq!(
        table.history().replacements().last().map(String::as_str),
        Some("https://archiv.example.org/vorlagen")
    );
}

#[test]
fn url_year_round_trips() {
    let mut first = attach(two_years(), PAGE, 10);
    first.set_filter(FilterDimension::Year, Some("2023"));
    let (_, history) = first.into_parts();

    let reloaded = attach(two_years(), &history.href(), 10);
    assert_eq!(reloaded.state().year.as_deref(), Some("2023"));
    assert_eq!(reloaded.total_matching(), 3);
}

#[test]
fn unknown_url_year_is_ignored() {
    let table = attach(two_years(), "https://archiv.example.org/vorlagen?jahr=1999", 10);
    assert_eq!(table.state().year, None);
    assert_eq!(table.dom().control_value(FilterDimension::Year), "");
    assert_eq!(table.total_matching(), 8);
    assert!(table.history().replacements().is_empty());
}

#[test]
fn padded_url_year_is_trimmed() {
    let table = attach(two_years(), "https://archiv.example.org/vorlagen?jahr=%202024%20", 10);
    assert_eq!(table.state().year.as_deref(), Some("2024"));
}

proptest! {
    #[test]
    fn visible_never_exceeds_cap(
        years in proptest::collection::vec(prop_oneof!["2022", "2023", "2024"], 0..60),
        batch in 1usize..8,
        pages in 0usize..5,
        pick in 0usize..4,
    ) {
        let rows: Vec<_> = years.iter().map(|year| row(year, "Antrag", "")).collect();
        let mut table = attach(rows, PAGE, batch);

        let year = ["", "2022", "2023", "2024"][pick];
        table.set_filter(FilterDimension::Year, Some(year));
        for _ in 0..pages {
            table.load_next_rows();
        }

        let expected = years.iter().filter(|y| year.is_empty() || y.as_str() == year).count();
        prop_assert_eq!(table.total_matching(), expected);
        prop_assert!(table.visible_rows().len() <= table.visible_match_limit());
        prop_assert_eq!(table.visible_rows().len(), expected.min(table.visible_match_limit()));
        prop_assert_eq!(table.dom().visible_rows(), table.visible_rows().to_vec());
        prop_assert_eq!(table.dom().load_trigger_hidden(), expected <= table.visible_match_limit());
    }
}
