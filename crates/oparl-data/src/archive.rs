//! The archive context
//!
//! One [`Archive`] holds a lazily loaded cache per published collection of a
//! deployment. Construct it once at startup and share it; every collection
//! is fetched at most once per archive.

use crate::config::ArchiveConfig;
use crate::facets::{FacetBuilder, FilterData};
use crate::resolve::Resolution;
use indexmap::IndexMap;
use oparl_model::{
    internal_reference, relevant_year, Districts, FileContent, Meeting, Organization, Paper,
};
use oparl_store::{
    fetch_list, fetch_record, ChunkLoadReport, ChunkedContentStore, Collection, DataSource,
    EntityMap, EntityStore, FetchError, Fetcher, HttpFetcher,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

/// Inconsistency found while loading papers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataIssue {
    /// Paper without a reference; it cannot be addressed and was dropped
    #[error("paper {paper_id} has no reference and was dropped")]
    MissingReference {
        /// OParl id of the dropped paper
        paper_id: String,
    },

    /// Two references map to the same public slug
    #[error("{reference} maps to {internal_reference}, already used by {kept_reference}")]
    DuplicateInternalReference {
        /// The shared slug
        internal_reference: String,
        /// Reference of the paper that lost the slug
        reference: String,
        /// Reference of the paper that kept it
        kept_reference: String,
    },
}

/// One static detail page
#[derive(Debug, Clone)]
pub struct DetailPath {
    /// Public slug of the paper
    pub reference: String,
    /// The paper rendered on the page
    pub paper: Arc<Paper>,
}

#[derive(Debug, Default)]
struct PaperSet {
    papers: Arc<[Arc<Paper>]>,
    by_slug: HashMap<String, Arc<Paper>>,
    issues: Vec<DataIssue>,
}

/// Every collection of one archive deployment
#[derive(Debug)]
pub struct Archive {
    config: ArchiveConfig,
    source: DataSource,
    fetcher: Arc<dyn Fetcher>,
    papers: OnceCell<Arc<PaperSet>>,
    paper_stadtteile: OnceCell<Arc<IndexMap<String, Districts>>>,
    meetings: EntityStore<Meeting>,
    organizations: EntityStore<Organization>,
    file_contents: ChunkedContentStore,
    facets: FacetBuilder,
    filter_data: OnceCell<Arc<FilterData>>,
    available_years: OnceCell<Arc<[String]>>,
    detail_paths: OnceCell<Arc<[DetailPath]>>,
}

impl Archive {
    /// Create archive reading through `fetcher`
    pub fn new(config: ArchiveConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let source = config.data_source();
        let meetings = EntityStore::new(
            Collection::Meetings.label(),
            source.url(Collection::Meetings),
            Arc::clone(&fetcher),
        );
        let organizations = EntityStore::new(
            Collection::Organizations.label(),
            source.url(Collection::Organizations),
            Arc::clone(&fetcher),
        );
        let file_contents =
            ChunkedContentStore::new(source.clone(), Arc::clone(&fetcher), config.chunk_loading());
        let facets = FacetBuilder::new(config.bulk_modified_date.clone());

        Self {
            config,
            source,
            fetcher,
            papers: OnceCell::new(),
            paper_stadtteile: OnceCell::new(),
            meetings,
            organizations,
            file_contents,
            facets,
            filter_data: OnceCell::new(),
            available_years: OnceCell::new(),
            detail_paths: OnceCell::new(),
        }
    }

    /// Create archive reading over HTTP with the configured timeout
    ///
    /// # Errors
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn over_http(config: ArchiveConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::with_timeout(config.request_timeout())?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Locations of the collections
    #[must_use]
    pub fn data_source(&self) -> &DataSource {
        &self.source
    }

    /// Active papers, newest modification first
    ///
    /// Deleted papers and papers without a reference are excluded. Each paper
    /// carries its internal reference and its districts.
    pub async fn load_papers(&self) -> Arc<[Arc<Paper>]> {
        Arc::clone(&self.paper_set().await.papers)
    }

    /// Meetings by id
    pub async fn load_meetings(&self) -> Arc<EntityMap<Meeting>> {
        self.meetings.entries().await
    }

    /// Organizations by id
    pub async fn load_organizations(&self) -> Arc<EntityMap<Organization>> {
        self.organizations.entries().await
    }

    /// File contents by id, with the first chunk-loading attempt merged
    pub async fn load_file_contents(&self) -> Arc<EntityMap<FileContent>> {
        self.file_contents.entries().await
    }

    /// Districts by paper reference
    pub async fn load_paper_stadtteile(&self) -> Arc<IndexMap<String, Districts>> {
        let districts = self
            .paper_stadtteile
            .get_or_init(|| async {
                let url = self.source.url(Collection::PaperStadtteile);
                let raw: IndexMap<String, Value> = fetch_record(
                    self.fetcher.as_ref(),
                    &url,
                    Collection::PaperStadtteile.label(),
                )
                .await;
                let map: IndexMap<String, Districts> = raw
                    .into_iter()
                    .map(|(reference, value)| (reference, Districts::from_value(&value)))
                    .collect();
                Arc::new(map)
            })
            .await;
        Arc::clone(districts)
    }

    /// Paper by its public slug
    pub async fn paper_by_internal_reference(&self, slug: &str) -> Option<Arc<Paper>> {
        self.paper_set().await.by_slug.get(slug).cloned()
    }

    /// Inconsistencies found while loading papers
    pub async fn data_issues(&self) -> Vec<DataIssue> {
        self.paper_set().await.issues.clone()
    }

    /// Distinct year buckets, ascending
    pub async fn available_years(&self) -> Arc<[String]> {
        let years = self
            .available_years
            .get_or_init(|| async {
                let papers = self.load_papers().await;
                let years: BTreeSet<&str> = papers
                    .iter()
                    .map(|paper| relevant_year(paper, &self.config.bulk_modified_date))
                    .filter(|year| !year.is_empty())
                    .collect();
                years.into_iter().map(str::to_string).collect()
            })
            .await;
        Arc::clone(years)
    }

    /// One detail page per loaded paper
    pub async fn detail_paths(&self) -> Arc<[DetailPath]> {
        let paths = self
            .detail_paths
            .get_or_init(|| async {
                self.load_papers()
                    .await
                    .iter()
                    .map(|paper| DetailPath {
                        reference: paper.internal_reference.clone(),
                        paper: Arc::clone(paper),
                    })
                    .collect()
            })
            .await;
        Arc::clone(paths)
    }

    /// Facet records and options, derived once
    pub async fn filter_data(&self) -> Arc<FilterData> {
        let data = self
            .filter_data
            .get_or_init(|| async {
                let (papers, organizations, meetings) = tokio::join!(
                    self.load_papers(),
                    self.load_organizations(),
                    self.load_meetings()
                );
                Arc::new(self.facets.build(&papers, &organizations, &meetings))
            })
            .await;
        Arc::clone(data)
    }

    /// Facet builder shared by every derivation of this archive
    #[must_use]
    pub fn facet_builder(&self) -> &FacetBuilder {
        &self.facets
    }

    /// Merge every remaining text chunk
    pub async fn preload_all_contents(&self) -> ChunkLoadReport {
        self.file_contents.preload_all_contents().await
    }

    /// Whether every text chunk has been merged
    #[must_use]
    pub fn contents_complete(&self) -> bool {
        self.file_contents.is_complete()
    }

    /// Snapshot of the collections the resolvers read
    pub async fn resolution(&self) -> Resolution {
        let (organizations, meetings, file_contents) = tokio::join!(
            self.load_organizations(),
            self.load_meetings(),
            self.load_file_contents()
        );
        Resolution::new(organizations, meetings, file_contents)
    }

    async fn paper_set(&self) -> &PaperSet {
        self.papers.get_or_init(|| self.init_papers()).await
    }

    #[instrument(skip(self))]
    async fn init_papers(&self) -> Arc<PaperSet> {
        let url = self.source.url(Collection::Papers);
        let (raw, stadtteile) = tokio::join!(
            fetch_list::<Paper>(self.fetcher.as_ref(), &url, Collection::Papers.label()),
            self.load_paper_stadtteile()
        );

        let total = raw.len();
        let set = build_paper_set(raw, &stadtteile);
        for issue in &set.issues {
            warn!(%issue, "paper data issue");
        }
        info!(total, active = set.papers.len(), "papers loaded");
        Arc::new(set)
    }
}

fn build_paper_set(raw: Vec<Paper>, stadtteile: &IndexMap<String, Districts>) -> PaperSet {
    let mut issues = Vec::new();
    let mut keyed: Vec<_> = raw
        .into_iter()
        .filter(|paper| !paper.deleted)
        .filter_map(|mut paper| {
            if paper.reference.is_empty() {
                issues.push(DataIssue::MissingReference {
                    paper_id: paper.id.clone(),
                });
                return None;
            }
            paper.internal_reference = internal_reference(&paper.reference);
            paper.stadtteile = stadtteile.get(&paper.reference).cloned().unwrap_or_default();
            Some((paper.modified_at(), paper))
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| newest_first(*a, *b));

    let papers: Arc<[Arc<Paper>]> = keyed
        .into_iter()
        .map(|(_, paper)| Arc::new(paper))
        .collect();
    let mut by_slug: HashMap<String, Arc<Paper>> = HashMap::with_capacity(papers.len());
    for paper in papers.iter() {
        if let Some(kept) = by_slug.get(&paper.internal_reference) {
            issues.push(DataIssue::DuplicateInternalReference {
                internal_reference: paper.internal_reference.clone(),
                reference: paper.reference.clone(),
                kept_reference: kept.reference.clone(),
            });
            continue;
        }
        by_slug.insert(paper.internal_reference.clone(), Arc::clone(paper));
    }

    PaperSet {
        papers,
        by_slug,
        issues,
    }
}

fn newest_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oparl_test_utils::{districts, paper};
    use proptest::prelude::*;

    #[test]
    fn newest_first_puts_unparseable_last() {
        assert_eq!(newest_first(Some(2), Some(1)), Ordering::Less);
        assert_eq!(newest_first(Some(1), None), Ordering::Less);
        assert_eq!(newest_first::<i32>(None, None), Ordering::Equal);
    }

    #[test]
    fn paper_set_filters_sorts_and_attaches() {
        let mut deleted = paper("2024/3", "2024-12-01");
        deleted.deleted = true;
        let mut anonymous = paper("", "2024-12-01");
        anonymous.id = "p/anon".into();

        let raw = vec![
            paper("2023/1", "2023-06-01T00:00:00Z"),
            deleted,
            paper("2024/1", "2024-06-01T00:00:00Z"),
            paper("2022/1", "gestern"),
            anonymous,
            paper("2024/2", "2024-06-01T00:00:00Z"),
        ];
        let stadtteile: IndexMap<String, Districts> =
            [("2024/1".to_string(), districts(&["Durlach"]))].into_iter().collect();

        let set = build_paper_set(raw, &stadtteile);
        let order: Vec<_> = set.papers.iter().map(|p| p.reference.as_str()).collect();
        assert_eq!(order, vec!["2024/1", "2024/2", "2023/1", "2022/1"]);
        assert_eq!(set.papers[0].internal_reference, "2024-1");
        assert!(set.papers[0].stadtteile.contains("Durlach"));
        assert!(set.papers[1].stadtteile.is_empty());
        assert_eq!(
            set.issues,
            vec![DataIssue::MissingReference { paper_id: "p/anon".into() }]
        );
    }

    #[test]
    fn duplicate_slugs_are_reported_and_first_wins() {
        let raw = vec![
            paper("2024-1", "2024-01-01"),
            paper("2024/1", "2024-02-01"),
        ];
        let set = build_paper_set(raw, &IndexMap::new());

        assert_eq!(set.papers.len(), 2);
        assert_eq!(set.by_slug["2024-1"].reference, "2024/1");
        assert_eq!(
            set.issues,
            vec![DataIssue::DuplicateInternalReference {
                internal_reference: "2024-1".into(),
                reference: "2024-1".into(),
                kept_reference: "2024/1".into(),
            }]
        );
    }

    fn position(paper: &Paper) -> usize {
        paper.reference.trim_start_matches("V/").parse().unwrap()
    }

    proptest! {
        #[test]
        fn paper_set_is_newest_first_and_stable(
            entries in proptest::collection::vec((0u8..4, any::<bool>()), 0..30)
        ) {
            let raw: Vec<Paper> = entries
                .iter()
                .enumerate()
                .map(|(i, (day, deleted))| {
                    let modified = if *day == 3 {
                        "gestern".to_string()
                    } else {
                        format!("2024-01-0{}", day + 1)
                    };
                    let mut p = paper(&format!("V/{i}"), &modified);
                    p.deleted = *deleted;
                    p
                })
                .collect();

            let set = build_paper_set(raw, &IndexMap::new());
            let active = entries.iter().filter(|(_, deleted)| !deleted).count();
            prop_assert_eq!(set.papers.len(), active);
            prop_assert!(set.issues.is_empty());
            for pair in set.papers.windows(2) {
                let order = newest_first(pair[0].modified_at(), pair[1].modified_at());
                prop_assert_ne!(order, Ordering::Greater);
                if order == Ordering::Equal {
                    prop_assert!(position(&pair[0]) < position(&pair[1]));
                }
            }
        }
    }
}
