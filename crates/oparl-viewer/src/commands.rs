//! Command implementations behind the CLI
//!
//! Every command returns a value; printing is left to the binary.

use crate::render::{dimension_options, memory_table, table_rows};
use anyhow::{Context, Result};
use chrono::Utc;
use oparl_data::{Archive, ArchiveConfig, Resolution};
use oparl_filter::{FilterDimension, History, MemoryHistory, PapersTable, TableOptions};
use oparl_model::{correct_url, format_date_long, Paper, TextState};
use oparl_search::{
    local_index_exists, FileStorage, SaveOutcome, SavedSearchControl, SavedSearchList,
    SearchAvailability, SearchStorage,
};
use oparl_store::{ChunkLoadReport, ChunkOutcome, FsFetcher};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Page URL the in-memory table pretends to live at
pub const DEFAULT_PAGE_URL: &str = "http://localhost/vorlagen";

/// Where the CLI keeps saved searches unless told otherwise
pub const DEFAULT_STORAGE_FILE: &str = "saved-searches.json";

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// TOML configuration file
    pub config_path: Option<PathBuf>,
    /// Overrides the configured base URL
    pub base_url: Option<String>,
    /// Serve collections from a local mirror instead of HTTP
    pub data_dir: Option<PathBuf>,
    /// Overrides the configured chunk limit
    pub max_chunks: Option<usize>,
}

/// Resolve the configuration: defaults, file, environment, flags
///
/// # Errors
/// Unreadable or invalid configuration
pub fn load_config<F>(settings: &Settings, env: F) -> Result<ArchiveConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match &settings.config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config file {}", path.display()))?;
            ArchiveConfig::from_toml_str(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => ArchiveConfig::default(),
    };
    let mut config = config.with_env_from(env).context("invalid environment override")?;

    if let Some(base_url) = &settings.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if settings.max_chunks.is_some() {
        config = config.with_max_chunks(settings.max_chunks);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Build the archive context for `config`
///
/// # Errors
/// The HTTP client cannot be built
pub fn open_archive(config: ArchiveConfig, data_dir: Option<&Path>) -> Result<Archive> {
    match data_dir {
        Some(root) => {
            info!(root = %root.display(), base_url = %config.base_url, "serving from local mirror");
            let fetcher = FsFetcher::new(config.base_url.clone(), root);
            Ok(Archive::new(config, Arc::new(fetcher)))
        }
        None => Archive::over_http(config).context("cannot create HTTP client"),
    }
}

/// Option lists of every dimension, in control order
pub async fn facets(archive: &Archive) -> Vec<(FilterDimension, Vec<String>)> {
    let filter_data = archive.filter_data().await;
    FilterDimension::ALL
        .into_iter()
        .map(|dimension| {
            (
                dimension,
                dimension_options(&filter_data.filter_options, dimension).to_vec(),
            )
        })
        .collect()
}

/// Human-readable facet listing
#[must_use]
pub fn format_facets(facets: &[(FilterDimension, Vec<String>)]) -> String {
    let mut out = String::new();
    for (dimension, options) in facets {
        let _ = writeln!(out, "{} ({}):", dimension.label(), options.len());
        for option in options {
            let _ = writeln!(out, "  {option}");
        }
    }
    out
}

/// One consultation of a paper, flattened for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationLine {
    pub meeting: Option<String>,
    pub date: String,
    pub role: String,
    pub agenda_item: Option<String>,
    pub result: Option<String>,
}

/// One attached file, flattened for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLine {
    pub name: String,
    pub url: String,
    /// `available`, `pending` or `absent`
    pub text: &'static str,
    pub text_chars: Option<usize>,
}

/// Detail view of one paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDetail {
    pub reference: String,
    pub internal_reference: String,
    pub name: String,
    pub paper_type: String,
    pub date: String,
    pub organizations: Vec<String>,
    pub districts: Vec<String>,
    pub consultations: Vec<ConsultationLine>,
    pub files: Vec<FileLine>,
}

impl PaperDetail {
    /// Flatten `paper` against loaded collections
    #[must_use]
    pub fn new(paper: &Paper, resolution: &Resolution) -> Self {
        let consultations = resolution
            .consultations(paper)
            .into_iter()
            .map(|resolved| ConsultationLine {
                meeting: resolved.meeting.map(|m| m.name.clone()),
                date: resolved
                    .meeting
                    .map(|m| format_date_long(&m.start))
                    .unwrap_or_default(),
                role: resolved.consultation.role.clone(),
                agenda_item: resolved.agenda_item.map(|item| item.name.clone()),
                result: resolved.result().map(str::to_string),
            })
            .collect();
        let files = resolution
            .files(paper)
            .into_iter()
            .map(|resolved| {
                let (text, text_chars) = match resolved.content.map(|c| c.text_state()) {
                    Some(TextState::Available(body)) => ("available", Some(body.chars().count())),
                    Some(TextState::Pending) => ("pending", None),
                    Some(TextState::Absent) | None => ("absent", None),
                };
                let url = if resolved.file.access_url.is_empty() {
                    &resolved.file.download_url
                } else {
                    &resolved.file.access_url
                };
                FileLine {
                    name: resolved.file.name.clone(),
                    url: correct_url(url),
                    text,
                    text_chars,
                }
            })
            .collect();

        Self {
            reference: paper.reference.clone(),
            internal_reference: paper.internal_reference.clone(),
            name: paper.name.clone(),
            paper_type: paper.paper_type.clone(),
            date: format_date_long(&paper.date),
            organizations: resolution
                .organizations(paper)
                .into_iter()
                .map(|org| org.name.clone())
                .collect(),
            districts: paper.stadtteile.iter().map(str::to_string).collect(),
            consultations,
            files,
        }
    }

    /// Plain-text rendering
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", self.name, self.reference);
        let _ = writeln!(out, "  Art: {}", self.paper_type);
        let _ = writeln!(out, "  Datum: {}", self.date);
        if !self.organizations.is_empty() {
            let _ = writeln!(out, "  Unter Leitung von: {}", self.organizations.join(", "));
        }
        if !self.districts.is_empty() {
            let _ = writeln!(out, "  Stadtteile: {}", self.districts.join(", "));
        }
        for line in &self.consultations {
            let _ = writeln!(
                out,
                "  Beratung: {} {} [{}] {}",
                line.meeting.as_deref().unwrap_or("?"),
                line.date,
                line.role,
                line.result.as_deref().unwrap_or("-"),
            );
        }
        for file in &self.files {
            let _ = writeln!(out, "  Datei: {} <{}> Text: {}", file.name, file.url, file.text);
        }
        out
    }
}

/// Detail of the paper published under `slug`
///
/// # Errors
/// No paper has that slug
pub async fn paper_detail(archive: &Archive, slug: &str) -> Result<PaperDetail> {
    let paper = archive
        .paper_by_internal_reference(slug)
        .await
        .with_context(|| format!("unknown paper reference {slug:?}"))?;
    let resolution = archive.resolution().await;
    Ok(PaperDetail::new(&paper, &resolution))
}

/// Human-readable chunk loading summary
#[must_use]
pub fn format_chunk_report(report: &ChunkLoadReport) -> String {
    let outcome = match report.outcome {
        ChunkOutcome::Exhausted { at } => format!("complete, chunk {at} does not exist"),
        ChunkOutcome::LimitReached => "stopped at the configured chunk limit".to_string(),
        ChunkOutcome::Failed { at } => format!("chunk {at} failed, retry later"),
        ChunkOutcome::AlreadyComplete => "already complete".to_string(),
    };
    format!(
        "{} chunks loaded, {} texts merged: {outcome}",
        report.chunks_loaded, report.texts_merged
    )
}

/// Parameters of the `table` command
#[derive(Debug, Clone)]
pub struct TableRequest {
    /// Filters applied one after another
    pub filters: Vec<(FilterDimension, String)>,
    /// Batches to reveal
    pub pages: usize,
    pub batch_size: usize,
    pub page_url: String,
}

impl Default for TableRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            pages: 1,
            batch_size: oparl_filter::INITIAL_PAPERS_BATCH_SIZE,
            page_url: DEFAULT_PAGE_URL.to_string(),
        }
    }
}

/// A visible table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLine {
    pub date_group: String,
    pub reference: String,
    pub name: String,
    pub paper_type: String,
    pub organization: String,
    pub result: String,
}

/// Result of driving the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub count_text: String,
    pub total_matching: usize,
    /// Whether the load trigger is still shown
    pub has_more: bool,
    /// Page URL after filtering
    pub url: String,
    pub rows: Vec<TableLine>,
}

/// Render every paper, apply `request` and collect the visible rows
///
/// # Errors
/// The rendered page lacks a required control
pub async fn table(archive: &Archive, request: &TableRequest) -> Result<TableReport> {
    let papers = archive.load_papers().await;
    let filter_data = archive.filter_data().await;
    let rendered = table_rows(&papers, &filter_data);
    let dom = memory_table(&rendered, &filter_data.filter_options);

    let options = TableOptions::default().with_batch_size(request.batch_size);
    let mut engine = PapersTable::init(dom, MemoryHistory::new(request.page_url.clone()), options)?;
    engine.on_animation_frame();
    for (dimension, value) in &request.filters {
        engine.set_filter(*dimension, Some(value));
    }
    for _ in 1..request.pages {
        if engine.load_next_rows().is_none() {
            break;
        }
    }

    let rows = engine
        .visible_rows()
        .iter()
        .filter_map(|&index| rendered.get(index))
        .map(|row| TableLine {
            date_group: row.attributes.date_group.clone(),
            reference: row.paper.reference.clone(),
            name: row.paper.name.clone(),
            paper_type: row.attributes.paper_type.clone(),
            organization: row.attributes.organization.clone(),
            result: row.attributes.result.clone(),
        })
        .collect();

    Ok(TableReport {
        count_text: engine.dom().count_text().to_string(),
        total_matching: engine.total_matching(),
        has_more: !engine.dom().load_trigger_hidden(),
        url: engine.history().href(),
        rows,
    })
}

/// Plain-text table, grouped under date headers
#[must_use]
pub fn format_table(report: &TableReport) -> String {
    let mut out = String::new();
    let mut current_group: Option<&str> = None;
    for row in &report.rows {
        if current_group != Some(row.date_group.as_str()) {
            let _ = writeln!(out, "{}", format_date_long(&row.date_group));
            current_group = Some(&row.date_group);
        }
        let _ = writeln!(
            out,
            "  {:<12} {:<18} {} [{}; {}]",
            row.reference, row.paper_type, row.name, row.organization, row.result
        );
    }
    let _ = writeln!(out, "{}", report.count_text);
    if report.has_more {
        let _ = writeln!(out, "(weitere Vorlagen mit --pages)");
    }
    out
}

/// Saved-search operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    List,
    Save(String),
    Remove(String),
    Clear,
}

/// Apply `action` to the saved searches in `storage_path`
///
/// Returns the status line of the action followed by the resulting list.
#[must_use]
pub fn saved_searches(storage_path: &Path, site_url: &str, action: &SearchAction) -> String {
    let storage: Option<Arc<dyn SearchStorage>> = match FileStorage::open(storage_path) {
        Ok(storage) => Some(Arc::new(storage)),
        Err(e) => {
            tracing::warn!(error = %e, "saved searches unavailable");
            None
        }
    };

    let mut out = String::new();
    match action {
        SearchAction::List => {}
        SearchAction::Save(query) => {
            let mut control = SavedSearchControl::new(storage.clone());
            control.set_query(query);
            let outcome = control.save(Utc::now());
            if let Some(status) = control.status_at(Utc::now()) {
                let _ = writeln!(out, "{}", status.text);
            } else if outcome == SaveOutcome::Ignored {
                let _ = writeln!(out, "Leere Suche nicht gespeichert.");
            }
        }
        SearchAction::Remove(query) => {
            let mut list = SavedSearchList::open(storage.clone(), site_url, false);
            if !list.remove(query) {
                let _ = writeln!(out, "Keine gespeicherte Suche \"{query}\".");
            }
        }
        SearchAction::Clear => {
            let mut list = SavedSearchList::open(storage.clone(), site_url, false);
            list.clear(true);
        }
    }

    let list = SavedSearchList::open(storage, site_url, false);
    match list.empty_reason() {
        Some(reason) => {
            let _ = writeln!(out, "{}", reason.message());
        }
        None => {
            let _ = writeln!(out, "{}", list.summary());
            for item in list.items() {
                let _ = writeln!(out, "  {} <{}>", item.query, item.href);
            }
        }
    }
    out
}

/// Whether search is offered, from the skip switch and the built site
#[must_use]
pub fn search_status(skip_value: Option<&str>, is_dev: bool, site_dir: Option<&Path>) -> SearchAvailability {
    let has_local_index = site_dir.is_some_and(local_index_exists);
    SearchAvailability::resolve(skip_value, is_dev, has_local_index)
}
