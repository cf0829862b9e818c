//! In-memory table container

use crate::dimension::FilterDimension;
use crate::dom::TableDom;
use crate::row::RowAttributes;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Control {
    options: Vec<String>,
    value: String,
}

/// [`TableDom`] kept in memory
///
/// Rows start visible, like freshly rendered markup. Row visibility writes
/// are counted so callers can check how many rows a pass touched.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    rows: Vec<RowAttributes>,
    row_visible: Vec<bool>,
    headers: Vec<(String, bool)>,
    controls: BTreeMap<FilterDimension, Control>,
    count_text: String,
    no_results_visible: bool,
    load_trigger_hidden: bool,
    row_mutations: usize,
}

impl MemoryTable {
    /// Table over `rows` with one header per distinct date group and no
    /// controls
    #[must_use]
    pub fn new(rows: Vec<RowAttributes>) -> Self {
        let mut seen = BTreeSet::new();
        let headers = rows
            .iter()
            .filter(|row| !row.date_group.is_empty() && seen.insert(row.date_group.clone()))
            .map(|row| (row.date_group.clone(), true))
            .collect();
        Self {
            row_visible: vec![true; rows.len()],
            rows,
            headers,
            ..Self::default()
        }
    }

    /// Add a control with the given options
    #[must_use]
    pub fn with_control(mut self, dimension: FilterDimension, options: Vec<String>) -> Self {
        self.controls.insert(
            dimension,
            Control {
                options,
                value: String::new(),
            },
        );
        self
    }

    /// Add every control, with options taken from the rows
    ///
    /// Years are offered newest first, all other values ascending.
    #[must_use]
    pub fn with_controls_from_rows(mut self) -> Self {
        for dimension in FilterDimension::ALL {
            let values: BTreeSet<String> = self
                .rows
                .iter()
                .flat_map(|row| row_values(row, dimension))
                .filter(|value| !value.is_empty())
                .collect();
            let mut options: Vec<String> = values.into_iter().collect();
            if dimension == FilterDimension::Year {
                options.reverse();
            }
            self = self.with_control(dimension, options);
        }
        self
    }

    /// Remove a control
    #[must_use]
    pub fn without_control(mut self, dimension: FilterDimension) -> Self {
        self.controls.remove(&dimension);
        self
    }

    /// Row attributes
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&RowAttributes> {
        self.rows.get(index)
    }

    /// Whether row `index` is shown
    #[must_use]
    pub fn is_row_visible(&self, index: usize) -> bool {
        self.row_visible.get(index).copied().unwrap_or(false)
    }

    /// Indices of shown rows, ascending
    #[must_use]
    pub fn visible_rows(&self) -> Vec<usize> {
        self.row_visible
            .iter()
            .enumerate()
            .filter_map(|(index, visible)| visible.then_some(index))
            .collect()
    }

    /// Whether the header for `date` is shown
    #[must_use]
    pub fn is_header_visible(&self, date: &str) -> bool {
        self.headers
            .iter()
            .any(|(header, visible)| header == date && *visible)
    }

    /// Result-count text
    #[must_use]
    pub fn count_text(&self) -> &str {
        &self.count_text
    }

    /// Whether the no-results element is shown
    #[must_use]
    pub fn no_results_visible(&self) -> bool {
        self.no_results_visible
    }

    /// Whether the load-more sentinel is hidden
    #[must_use]
    pub fn load_trigger_hidden(&self) -> bool {
        self.load_trigger_hidden
    }

    /// Row visibility writes since creation or the last reset
    #[must_use]
    pub fn row_mutations(&self) -> usize {
        self.row_mutations
    }

    /// Reset the mutation counter
    pub fn reset_row_mutations(&mut self) {
        self.row_mutations = 0;
    }
}

fn row_values(row: &RowAttributes, dimension: FilterDimension) -> Vec<String> {
    match dimension {
        FilterDimension::Year => vec![row.year.clone()],
        FilterDimension::Type => vec![row.paper_type.clone()],
        FilterDimension::Organization => vec![row.organization.clone()],
        FilterDimension::Role => vec![row.role.clone()],
        FilterDimension::Result => vec![row.result.clone()],
        FilterDimension::Stadtteil => row
            .stadtteile
            .split(oparl_model::FILTER_VALUE_SEPARATOR)
            .map(str::to_string)
            .collect(),
    }
}

impl TableDom for MemoryTable {
    fn rows(&self) -> Vec<RowAttributes> {
        self.rows.clone()
    }

    fn date_headers(&self) -> Vec<String> {
        self.headers.iter().map(|(date, _)| date.clone()).collect()
    }

    fn has_control(&self, dimension: FilterDimension) -> bool {
        self.controls.contains_key(&dimension)
    }

    fn control_options(&self, dimension: FilterDimension) -> Vec<String> {
        self.controls
            .get(&dimension)
            .map(|control| control.options.clone())
            .unwrap_or_default()
    }

    fn control_value(&self, dimension: FilterDimension) -> String {
        self.controls
            .get(&dimension)
            .map(|control| control.value.clone())
            .unwrap_or_default()
    }

    fn set_control_value(&mut self, dimension: FilterDimension, value: &str) {
        if let Some(control) = self.controls.get_mut(&dimension) {
            control.value = value.to_string();
        }
    }

    fn set_row_visible(&mut self, index: usize, visible: bool) {
        if let Some(slot) = self.row_visible.get_mut(index) {
            *slot = visible;
            self.row_mutations += 1;
        }
    }

    fn set_header_visible(&mut self, index: usize, visible: bool) {
        if let Some((_, slot)) = self.headers.get_mut(index) {
            *slot = visible;
        }
    }

    fn set_count_text(&mut self, text: &str) {
        self.count_text = text.to_string();
    }

    fn set_no_results_visible(&mut self, visible: bool) {
        self.no_results_visible = visible;
    }

    fn set_load_trigger_hidden(&mut self, hidden: bool) {
        self.load_trigger_hidden = hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(date: &str, year: &str, districts: &str) -> RowAttributes {
        RowAttributes {
            date_group: date.into(),
            year: year.into(),
            stadtteile: districts.into(),
            ..RowAttributes::default()
        }
    }

    #[test]
    fn headers_follow_first_appearance() {
        let table = MemoryTable::new(vec![
            attrs("2024-02-01", "2024", ""),
            attrs("2024-01-01", "2024", ""),
            attrs("2024-02-01", "2024", ""),
        ]);
        assert_eq!(table.date_headers(), vec!["2024-02-01", "2024-01-01"]);
        assert_eq!(table.visible_rows(), vec![0, 1, 2]);
    }

    #[test]
    fn controls_from_rows() {
        let table = MemoryTable::new(vec![
            attrs("d", "2023", "Durlach|Oststadt"),
            attrs("d", "2024", "Durlach"),
        ])
        .with_controls_from_rows()
        .without_control(FilterDimension::Role);

        assert_eq!(table.control_options(FilterDimension::Year), vec!["2024", "2023"]);
        assert_eq!(
            table.control_options(FilterDimension::Stadtteil),
            vec!["Durlach", "Oststadt"]
        );
        assert!(!table.has_control(FilterDimension::Role));
    }

    #[test]
    fn row_writes_are_counted() {
        let mut table = MemoryTable::new(vec![attrs("d", "2024", ""); 3]);
        table.set_row_visible(1, false);
        table.set_row_visible(9, false);
        assert_eq!(table.row_mutations(), 1);
        assert_eq!(table.visible_rows(), vec![0, 2]);
    }
}
