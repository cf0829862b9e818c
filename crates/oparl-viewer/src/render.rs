//! Rendering papers into table rows
//!
//! The list page emits one row per paper, carrying the facet values as row
//! attributes, and one date header per distinct date group.

use oparl_data::{FilterData, PaperFilterData, PaperFilterOptions};
use oparl_filter::{FilterDimension, MemoryTable, RowAttributes};
use oparl_model::Paper;
use std::sync::Arc;
use tracing::warn;

/// A paper with its rendered row
#[derive(Debug, Clone)]
pub struct RenderedRow {
    pub paper: Arc<Paper>,
    pub attributes: RowAttributes,
}

/// Date header a paper is listed under: the day of its last modification
///
/// Papers without a usable timestamp fall back to their own date.
#[must_use]
pub fn date_group(paper: &Paper) -> String {
    let source = if paper.modified_at().is_some() {
        &paper.modified
    } else {
        &paper.date
    };
    source.get(..10).unwrap_or(source).to_string()
}

/// Row attributes of one paper
#[must_use]
pub fn row_attributes(paper: &Paper, facets: &PaperFilterData) -> RowAttributes {
    RowAttributes {
        date_group: date_group(paper),
        year: facets.year.clone(),
        paper_type: facets.paper_type.clone(),
        organization: facets.organization_names.clone(),
        role: facets.last_role.clone(),
        result: facets.last_result.clone(),
        stadtteile: facets.stadtteile_filter_value.clone(),
    }
}

/// Rows for `papers` in list order
pub fn table_rows(papers: &[Arc<Paper>], filter_data: &FilterData) -> Vec<RenderedRow> {
    papers
        .iter()
        .filter_map(|paper| match filter_data.get(&paper.reference) {
            Some(facets) => Some(RenderedRow {
                paper: Arc::clone(paper),
                attributes: row_attributes(paper, facets),
            }),
            None => {
                warn!(reference = %paper.reference, "paper has no filter record");
                None
            }
        })
        .collect()
}

/// In-memory page holding `rows` and one select per dimension
///
/// The district select is only rendered when some paper names a district.
#[must_use]
pub fn memory_table(rows: &[RenderedRow], options: &PaperFilterOptions) -> MemoryTable {
    let table = MemoryTable::new(rows.iter().map(|row| row.attributes.clone()).collect())
        .with_control(FilterDimension::Year, options.years.clone())
        .with_control(FilterDimension::Type, options.paper_types.clone())
        .with_control(FilterDimension::Organization, options.organizations.clone())
        .with_control(FilterDimension::Role, options.roles.clone())
        .with_control(FilterDimension::Result, options.results.clone());
    if options.stadtteile.is_empty() {
        table
    } else {
        table.with_control(FilterDimension::Stadtteil, options.stadtteile.clone())
    }
}

/// Option list of one dimension
#[must_use]
pub fn dimension_options(options: &PaperFilterOptions, dimension: FilterDimension) -> &[String] {
    match dimension {
        FilterDimension::Year => &options.years,
        FilterDimension::Type => &options.paper_types,
        FilterDimension::Organization => &options.organizations,
        FilterDimension::Role => &options.roles,
        FilterDimension::Result => &options.results,
        FilterDimension::Stadtteil => &options.stadtteile,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oparl_test_utils::paper;

    #[test]
    fn date_group_uses_the_modification_day() {
        assert_eq!(date_group(&paper("2024/1", "2024-11-02T23:30:00Z")), "2024-11-02");

        let mut undated = paper("2024/2", "unbekannt");
        undated.date = "2019-07-01".to_string();
        assert_eq!(date_group(&undated), "2019-07-01");
    }

    #[test]
    fn district_select_is_optional() {
        let table = memory_table(&[], &PaperFilterOptions::default());
        assert!(oparl_filter::TableDom::has_control(&table, FilterDimension::Year));
        assert!(!oparl_filter::TableDom::has_control(&table, FilterDimension::Stadtteil));
    }
}
