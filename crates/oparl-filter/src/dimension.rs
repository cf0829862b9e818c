//! Filter dimensions and the active selection

use crate::row::PaperRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One filterable dimension of the paper table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    /// Year bucket
    Year,
    /// Paper type
    Type,
    /// Directing organization
    Organization,
    /// Role of the latest consultation
    Role,
    /// Result of the latest consultation
    Result,
    /// Mentioned district
    Stadtteil,
}

impl FilterDimension {
    /// All dimensions in display order
    pub const ALL: [FilterDimension; 6] = [
        FilterDimension::Year,
        FilterDimension::Type,
        FilterDimension::Organization,
        FilterDimension::Role,
        FilterDimension::Result,
        FilterDimension::Stadtteil,
    ];

    /// Element id of the select control
    #[must_use]
    pub const fn control_id(self) -> &'static str {
        match self {
            Self::Year => "filter-year",
            Self::Type => "filter-type",
            Self::Organization => "filter-org",
            Self::Role => "filter-role",
            Self::Result => "filter-result",
            Self::Stadtteil => "filter-stadtteil",
        }
    }

    /// Control label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Year => "Jahr",
            Self::Type => "Art",
            Self::Organization => "Unter Leitung von",
            Self::Role => "Letzte Rolle",
            Self::Result => "Letztes Beratungsergebnis",
            Self::Stadtteil => "Erwähnter Stadtteil",
        }
    }

    /// Whether a table may omit this control
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Stadtteil)
    }

    /// Look up a dimension by control id
    #[must_use]
    pub fn from_control_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dimension| dimension.control_id() == id)
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.control_id())
    }
}

/// Selected value per dimension; `None` matches every row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected year
    pub year: Option<String>,
    /// Selected paper type
    pub paper_type: Option<String>,
    /// Selected organization name
    pub organization: Option<String>,
    /// Selected consultation role
    pub role: Option<String>,
    /// Selected consultation result
    pub result: Option<String>,
    /// Selected district
    pub stadtteil: Option<String>,
}

impl FilterState {
    /// Value of one dimension
    #[must_use]
    pub fn get(&self, dimension: FilterDimension) -> Option<&str> {
        self.slot(dimension).as_deref()
    }

    /// Set one dimension; an empty value unsets it
    pub fn set(&mut self, dimension: FilterDimension, value: Option<&str>) {
        *self.slot_mut(dimension) = value.filter(|v| !v.is_empty()).map(str::to_string);
    }

    /// Builder form of [`Self::set`]
    #[must_use]
    pub fn with(mut self, dimension: FilterDimension, value: &str) -> Self {
        self.set(dimension, Some(value));
        self
    }

    /// Whether any dimension is set
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        FilterDimension::ALL
            .into_iter()
            .any(|dimension| self.get(dimension).is_some())
    }

    /// Every predicate except the year
    ///
    /// The district dimension tests membership, all others equality.
    #[must_use]
    pub fn matches_secondary(&self, row: &PaperRow) -> bool {
        fn eq(filter: Option<&str>, value: &str) -> bool {
            filter.map_or(true, |f| f == value)
        }

        eq(self.paper_type.as_deref(), &row.paper_type)
            && eq(self.organization.as_deref(), &row.organization)
            && eq(self.role.as_deref(), &row.role)
            && eq(self.result.as_deref(), &row.result)
            && self
                .stadtteil
                .as_deref()
                .map_or(true, |district| row.stadtteile.contains(district))
    }

    /// All predicates including the year
    #[must_use]
    pub fn matches(&self, row: &PaperRow) -> bool {
        self.year.as_deref().map_or(true, |year| year == row.year) && self.matches_secondary(row)
    }

    fn slot(&self, dimension: FilterDimension) -> &Option<String> {
        match dimension {
            FilterDimension::Year => &self.year,
            FilterDimension::Type => &self.paper_type,
            FilterDimension::Organization => &self.organization,
            FilterDimension::Role => &self.role,
            FilterDimension::Result => &self.result,
            FilterDimension::Stadtteil => &self.stadtteil,
        }
    }

    fn slot_mut(&mut self, dimension: FilterDimension) -> &mut Option<String> {
        match dimension {
            FilterDimension::Year => &mut self.year,
            FilterDimension::Type => &mut self.paper_type,
            FilterDimension::Organization => &mut self.organization,
            FilterDimension::Role => &mut self.role,
            FilterDimension::Result => &mut self.result,
            FilterDimension::Stadtteil => &mut self.stadtteil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowAttributes;

    fn row() -> PaperRow {
        PaperRow::from(&RowAttributes {
            date_group: "2024-05-01".into(),
            year: "2024".into(),
            paper_type: "Antrag".into(),
            organization: "Gemeinderat".into(),
            role: "Entscheidung".into(),
            result: "beschlossen".into(),
            stadtteile: "Durlach|Oststadt".into(),
        })
    }

    #[test]
    fn control_ids_round_trip() {
        for dimension in FilterDimension::ALL {
            assert_eq!(FilterDimension::from_control_id(dimension.control_id()), Some(dimension));
        }
        assert_eq!(FilterDimension::from_control_id("filter-color"), None);
        assert_eq!(FilterDimension::Organization.label(), "Unter Leitung von");
    }

    #[test]
    fn empty_state_matches_everything() {
        let state = FilterState::default();
        assert!(!state.is_filtered());
        assert!(state.matches(&row()));
    }

    #[test]
    fn empty_value_unsets() {
        let mut state = FilterState::default().with(FilterDimension::Role, "Entscheidung");
        assert!(state.is_filtered());
        state.set(FilterDimension::Role, Some(""));
        assert_eq!(state.get(FilterDimension::Role), None);
    }

    #[test]
    fn district_is_membership() {
        let row = row();
        assert!(FilterState::default()
            .with(FilterDimension::Stadtteil, "Oststadt")
            .matches(&row));
        assert!(!FilterState::default()
            .with(FilterDimension::Stadtteil, "Durlach|Oststadt")
            .matches(&row));
    }

    #[test]
    fn equality_dimensions() {
        let row = row();
        let state = FilterState::default()
            .with(FilterDimension::Year, "2024")
            .with(FilterDimension::Type, "Antrag")
            .with(FilterDimension::Result, "beschlossen");
        assert!(state.matches(&row));
        assert!(!state.clone().with(FilterDimension::Year, "2023").matches(&row));
        assert!(state.clone().with(FilterDimension::Year, "2023").matches_secondary(&row));
        assert!(!state.with(FilterDimension::Organization, "Bauausschuss").matches(&row));
    }
}
