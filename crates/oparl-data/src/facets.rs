//! Filter facets derived from the loaded collections
//!
//! [`FacetBuilder::build`] produces, in one pass over the papers, the
//! precomputed filter record of every paper and the sorted option lists of
//! every dimension.
//!
//! Resolving a paper's last result needs the agenda item of each
//! consultation. Instead of scanning a meeting's agenda for every
//! consultation, a [`ResultIndex`] (meeting id → agenda item id → result) is
//! built once per meeting collection and reused while the same collection is
//! passed in again.

use indexmap::IndexMap;
use oparl_model::{relevant_year, Meeting, Organization, Paper};
use oparl_store::EntityMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Label for a single missing value (role, result)
pub const NO_VALUE: &str = "Keine Angabe";

/// Label for an empty list (organizations, districts)
pub const NO_VALUES: &str = "Keine Angaben";

/// Precomputed filter and display values of one paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperFilterData {
    pub year: String,
    pub paper_type: String,
    pub organization_names: String,
    pub last_role: String,
    pub last_result: String,
    pub stadtteile_label: String,
    pub stadtteile_filter_value: String,
}

/// Sorted distinct values per dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperFilterOptions {
    /// Descending
    pub years: Vec<String>,
    pub paper_types: Vec<String>,
    pub organizations: Vec<String>,
    pub roles: Vec<String>,
    pub results: Vec<String>,
    pub stadtteile: Vec<String>,
}

/// Facet derivation output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterData {
    /// Keyed by paper reference, in paper order
    pub filter_data: IndexMap<String, PaperFilterData>,
    pub filter_options: PaperFilterOptions,
}

impl FilterData {
    /// Filter record for a paper reference
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&PaperFilterData> {
        self.filter_data.get(reference)
    }
}

/// Agenda results by meeting id and agenda item id
#[derive(Debug, Default)]
pub struct ResultIndex {
    results: HashMap<String, HashMap<String, String>>,
}

impl ResultIndex {
    /// Index every non-empty agenda result
    #[must_use]
    pub fn build(meetings: &EntityMap<Meeting>) -> Self {
        let results = meetings
            .iter()
            .map(|(meeting_id, meeting)| {
                let items = meeting
                    .agenda_item
                    .iter()
                    .filter_map(|item| Some((item.id.clone(), item.result()?.to_string())))
                    .collect();
                (meeting_id.clone(), items)
            })
            .collect();
        Self { results }
    }

    /// Result of an agenda item
    #[must_use]
    pub fn result(&self, meeting_id: &str, agenda_item_id: &str) -> Option<&str> {
        self.results
            .get(meeting_id)?
            .get(agenda_item_id)
            .map(String::as_str)
    }
}

/// Last non-empty role and result of a paper's consultations, in list order
#[must_use]
pub fn last_consultation_meta(paper: &Paper, index: &ResultIndex) -> (String, String) {
    let mut last_role = NO_VALUE;
    let mut last_result = NO_VALUE;

    for consultation in &paper.consultation {
        if !consultation.role.is_empty() {
            last_role = consultation.role.as_str();
        }
        if let Some(result) = index.result(&consultation.meeting, &consultation.agenda_item) {
            last_result = result;
        }
    }

    (last_role.to_string(), last_result.to_string())
}

/// Joined names of the directing organizations
#[must_use]
pub fn organization_names(paper: &Paper, organizations: &EntityMap<Organization>) -> String {
    let names: Vec<&str> = paper
        .under_direction_of
        .iter()
        .filter_map(|id| organizations.get(id))
        .map(|org| org.name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        NO_VALUES.to_string()
    } else {
        names.join(", ")
    }
}

type CachedIndex = (Weak<EntityMap<Meeting>>, Arc<ResultIndex>);

/// Derives [`FilterData`], caching the result index per meeting collection
#[derive(Debug)]
pub struct FacetBuilder {
    bulk_modified_date: String,
    cached: Mutex<Option<CachedIndex>>,
    index_builds: AtomicUsize,
}

impl FacetBuilder {
    /// Create builder using `bulk_modified_date` for year buckets
    pub fn new(bulk_modified_date: impl Into<String>) -> Self {
        Self {
            bulk_modified_date: bulk_modified_date.into(),
            cached: Mutex::new(None),
            index_builds: AtomicUsize::new(0),
        }
    }

    /// Result index for `meetings`, reused while the same collection is passed
    pub fn result_index(&self, meetings: &Arc<EntityMap<Meeting>>) -> Arc<ResultIndex> {
        let mut cached = self.cached.lock();
        if let Some((source, index)) = cached.as_ref() {
            if source.upgrade().is_some_and(|live| Arc::ptr_eq(&live, meetings)) {
                return Arc::clone(index);
            }
        }

        let index = Arc::new(ResultIndex::build(meetings));
        self.index_builds.fetch_add(1, Ordering::Relaxed);
        debug!(meetings = meetings.len(), "built agenda result index");
        *cached = Some((Arc::downgrade(meetings), Arc::clone(&index)));
        index
    }

    /// How many result indexes have been built
    #[must_use]
    pub fn index_builds(&self) -> usize {
        self.index_builds.load(Ordering::Relaxed)
    }

    /// Filter records and options for `papers`
    ///
    /// Records are keyed by paper reference; the first paper with a given
    /// reference wins.
    pub fn build(
        &self,
        papers: &[Arc<Paper>],
        organizations: &EntityMap<Organization>,
        meetings: &Arc<EntityMap<Meeting>>,
    ) -> FilterData {
        let index = self.result_index(meetings);

        let mut filter_data = IndexMap::with_capacity(papers.len());
        let mut years = BTreeSet::new();
        let mut paper_types = BTreeSet::new();
        let mut organization_set = BTreeSet::new();
        let mut roles = BTreeSet::new();
        let mut results = BTreeSet::new();
        let mut stadtteile = BTreeSet::new();

        for paper in papers {
            let year = relevant_year(paper, &self.bulk_modified_date).to_string();
            let organization_names = organization_names(paper, organizations);
            let (last_role, last_result) = last_consultation_meta(paper, &index);

            if !year.is_empty() {
                years.insert(year.clone());
            }
            if !paper.paper_type.is_empty() {
                paper_types.insert(paper.paper_type.clone());
            }
            organization_set.insert(organization_names.clone());
            roles.insert(last_role.clone());
            results.insert(last_result.clone());
            stadtteile.extend(paper.stadtteile.iter().map(str::to_string));

            filter_data
                .entry(paper.reference.clone())
                .or_insert_with(|| PaperFilterData {
                    year,
                    paper_type: paper.paper_type.clone(),
                    organization_names,
                    last_role,
                    last_result,
                    stadtteile_label: paper
                        .stadtteile
                        .label()
                        .unwrap_or_else(|| NO_VALUES.to_string()),
                    stadtteile_filter_value: paper.stadtteile.filter_value(),
                });
        }

        FilterData {
            filter_data,
            filter_options: PaperFilterOptions {
                years: years.into_iter().rev().collect(),
                paper_types: paper_types.into_iter().collect(),
                organizations: organization_set.into_iter().collect(),
                roles: roles.into_iter().collect(),
                results: results.into_iter().collect(),
                stadtteile: stadtteile.into_iter().collect(),
            },
        }
    }
}

impl Default for FacetBuilder {
    fn default() -> Self {
        Self::new(oparl_model::BULK_MODIFIED_DATE)
    }
}
