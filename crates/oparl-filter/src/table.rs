//! The filter and pagination engine
//!
//! A [`PapersTable`] owns one rendered container for its whole lifetime:
//!
//! 1. **Index**: rows are read once into a flat list and a year index.
//! 2. **Narrow**: a selected year picks its candidate rows from the index
//!    before the other predicates run.
//! 3. **Cap**: at most `visible_match_limit` matching rows are shown; the rest
//!    are counted but stay hidden.
//! 4. **Diff**: only rows whose visibility changed since the previous pass
//!    are written.
//! 5. **Status**: date headers, count text, no-results and the load trigger
//!    are derived from the pass.
//!
//! The selected year is mirrored into the page URL.

use crate::dimension::{FilterDimension, FilterState};
use crate::dom::TableDom;
use crate::history::History;
use crate::row::PaperRow;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use url::Url;

/// Matching rows revealed per page
pub const INITIAL_PAPERS_BATCH_SIZE: usize = 500;

/// Query parameter carrying the selected year
pub const YEAR_QUERY_PARAM: &str = "jahr";

/// Errors while attaching to a container
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// A required filter control is absent
    #[error("missing filter control #{}", .0.control_id())]
    MissingControl(FilterDimension),
}

/// Engine options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Growth of the visible-match limit per page (values below 1 act as 1)
    pub batch_size: usize,
    /// Query parameter for the year
    pub year_query_param: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            batch_size: INITIAL_PAPERS_BATCH_SIZE,
            year_query_param: YEAR_QUERY_PARAM.to_string(),
        }
    }
}

impl TableOptions {
    /// Set batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Summary of one filter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPass {
    /// Rows matching every filter
    pub matching: usize,
    /// Rows shown after the pass
    pub visible: usize,
    /// Rows shown by this pass
    pub shown: usize,
    /// Rows hidden by this pass
    pub hidden: usize,
}

/// Filter and pagination state of one rendered table
#[derive(Debug)]
pub struct PapersTable<D, H> {
    dom: D,
    history: H,
    options: TableOptions,
    rows: Vec<PaperRow>,
    rows_by_year: HashMap<String, Vec<usize>>,
    header_dates: Vec<String>,
    visible_rows: Vec<usize>,
    row_visible: Vec<bool>,
    in_next_pass: Vec<bool>,
    visible_match_limit: usize,
    total_matching: usize,
    frame_pending: bool,
}

impl<D: TableDom, H: History> PapersTable<D, H> {
    /// Attach to a container
    ///
    /// Indexes the rows, restores the year from the URL and schedules the
    /// first pass for the next animation frame.
    ///
    /// # Errors
    /// [`FilterError::MissingControl`] when a control other than the district
    /// control is absent.
    pub fn init(dom: D, history: H, options: TableOptions) -> Result<Self, FilterError> {
        if let Some(missing) = FilterDimension::ALL
            .into_iter()
            .find(|dimension| !dimension.is_optional() && !dom.has_control(*dimension))
        {
            return Err(FilterError::MissingControl(missing));
        }

        let rows: Vec<PaperRow> = dom.rows().iter().map(PaperRow::from).collect();
        let mut rows_by_year: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, row) in rows.iter().enumerate() {
            rows_by_year.entry(row.year.clone()).or_default().push(index);
        }
        let header_dates = dom.date_headers();
        let count = rows.len();

        let mut table = Self {
            dom,
            history,
            visible_match_limit: options.batch_size.max(1),
            options,
            rows,
            rows_by_year,
            header_dates,
            visible_rows: (0..count).collect(),
            row_visible: vec![true; count],
            in_next_pass: vec![false; count],
            total_matching: 0,
            frame_pending: false,
        };
        table.apply_year_from_url();
        table.schedule_run();
        debug!(rows = count, "papers table indexed");
        Ok(table)
    }

    /// Change one filter, reset the limit and re-run
    ///
    /// A year change is also written to the URL.
    pub fn set_filter(&mut self, dimension: FilterDimension, value: Option<&str>) -> FilterPass {
        if dimension.is_optional() && !self.dom.has_control(dimension) {
            return self.run();
        }
        self.dom.set_control_value(dimension, value.unwrap_or_default());
        self.visible_match_limit = self.batch_size();
        let pass = self.run();
        if dimension == FilterDimension::Year {
            self.sync_year_to_url();
        }
        pass
    }

    /// Raise the limit by one batch if more matches remain
    ///
    /// Called whenever the load trigger becomes visible, or when the next
    /// page is requested explicitly. Returns `None` when nothing was left.
    pub fn load_next_rows(&mut self) -> Option<FilterPass> {
        if self.total_matching <= self.visible_match_limit {
            return None;
        }
        self.visible_match_limit += self.batch_size();
        Some(self.run())
    }

    /// Request a pass on the next animation frame
    pub fn schedule_run(&mut self) {
        self.frame_pending = true;
    }

    /// Run the pending pass, if any
    pub fn on_animation_frame(&mut self) -> Option<FilterPass> {
        if !std::mem::take(&mut self.frame_pending) {
            return None;
        }
        Some(self.run())
    }

    /// Page restored from cache: controls may hold restored values
    pub fn on_page_show(&mut self) {
        self.schedule_run();
    }

    /// Whether a pass is waiting for the next frame
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.frame_pending
    }

    /// Selection as currently shown by the controls
    #[must_use]
    pub fn state(&self) -> FilterState {
        let mut state = FilterState::default();
        for dimension in FilterDimension::ALL {
            if self.dom.has_control(dimension) {
                state.set(dimension, Some(&self.dom.control_value(dimension)));
            }
        }
        state
    }

    /// Current limit on shown matches
    #[must_use]
    pub fn visible_match_limit(&self) -> usize {
        self.visible_match_limit
    }

    /// Matches counted by the last pass
    #[must_use]
    pub fn total_matching(&self) -> usize {
        self.total_matching
    }

    /// Rows shown after the last pass, in document order
    #[must_use]
    pub fn visible_rows(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Number of indexed rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Indexed row
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&PaperRow> {
        self.rows.get(index)
    }

    /// Container
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Container, mutably (e.g. to restore control values)
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// History
    pub fn history(&self) -> &H {
        &self.history
    }

    /// Detach, returning container and history
    pub fn into_parts(self) -> (D, H) {
        (self.dom, self.history)
    }

    /// Apply the filters now
    pub fn run(&mut self) -> FilterPass {
        let state = self.state();
        let limit = self.visible_match_limit;

        let mut next_visible = Vec::new();
        let mut visible_dates = HashSet::new();
        let mut matching = 0;
        let mut consider = |index: usize| {
            let row = &self.rows[index];
            if !state.matches_secondary(row) {
                return;
            }
            matching += 1;
            if matching > limit {
                return;
            }
            next_visible.push(index);
            if !row.date_group.is_empty() {
                visible_dates.insert(row.date_group.as_str());
            }
        };
        match state.year.as_deref() {
            Some(year) => {
                if let Some(indices) = self.rows_by_year.get(year) {
                    indices.iter().copied().for_each(&mut consider);
                }
            }
            None => (0..self.rows.len()).for_each(&mut consider),
        }

        for &index in &next_visible {
            self.in_next_pass[index] = true;
        }

        let mut hidden = 0;
        for &index in &self.visible_rows {
            if !self.in_next_pass[index] {
                self.dom.set_row_visible(index, false);
                self.row_visible[index] = false;
                hidden += 1;
            }
        }

        let mut shown = 0;
        for &index in &next_visible {
            if !self.row_visible[index] {
                self.dom.set_row_visible(index, true);
                self.row_visible[index] = true;
                shown += 1;
            }
            self.in_next_pass[index] = false;
        }

        for (index, date) in self.header_dates.iter().enumerate() {
            self.dom
                .set_header_visible(index, visible_dates.contains(date.as_str()));
        }

        let count_text = if state.is_filtered() {
            format!("{matching} von {} Vorlagen", self.rows.len())
        } else {
            String::new()
        };
        self.dom.set_count_text(&count_text);
        self.dom.set_no_results_visible(matching == 0);
        self.dom.set_load_trigger_hidden(matching <= limit);

        let visible = next_visible.len();
        self.visible_rows = next_visible;
        self.total_matching = matching;

        debug!(matching, visible, shown, hidden, limit, "filter pass");
        FilterPass {
            matching,
            visible,
            shown,
            hidden,
        }
    }

    fn batch_size(&self) -> usize {
        self.options.batch_size.max(1)
    }

    fn apply_year_from_url(&mut self) {
        let Some(url) = self.current_url() else {
            return;
        };
        let Some(year) = url
            .query_pairs()
            .find(|(key, _)| key == self.options.year_query_param.as_str())
            .map(|(_, value)| value.trim().to_string())
        else {
            return;
        };

        if year.is_empty() {
            return;
        }
        if self
            .dom
            .control_options(FilterDimension::Year)
            .iter()
            .any(|option| *option == year)
        {
            self.dom.set_control_value(FilterDimension::Year, &year);
        } else {
            debug!(%year, "ignoring unknown year from URL");
        }
    }

    fn sync_year_to_url(&mut self) {
        let Some(mut url) = self.current_url() else {
            return;
        };
        let param = self.options.year_query_param.as_str();
        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != param)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        let year = self.dom.control_value(FilterDimension::Year);
        if !year.is_empty() {
            pairs.push((param.to_string(), year));
        }

        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&pairs);
        }
        self.history.replace_state(url.as_str());
    }

    fn current_url(&self) -> Option<Url> {
        let href = self.history.href();
        match Url::parse(&href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(%href, error = %e, "cannot parse page URL");
                None
            }
        }
    }
}
