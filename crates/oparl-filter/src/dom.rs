//! Access to one rendered table container
//!
//! The engine never creates or removes elements. It reads the rows, the date
//! headers and the filter controls once, and afterwards only toggles
//! visibility and writes status text.

use crate::dimension::FilterDimension;
use crate::row::RowAttributes;

/// A rendered paper table
///
/// Row and header indices refer to the order returned by [`TableDom::rows`]
/// and [`TableDom::date_headers`]. The result count, no-results and load
/// trigger elements are optional; implementations without them ignore the
/// corresponding writes.
pub trait TableDom {
    /// Attributes of every row, in document order
    fn rows(&self) -> Vec<RowAttributes>;

    /// Date key of every date-group header, in document order
    fn date_headers(&self) -> Vec<String>;

    /// Whether the container has a control for `dimension`
    fn has_control(&self, dimension: FilterDimension) -> bool;

    /// Selectable values of a control, without the "all" entry
    fn control_options(&self, dimension: FilterDimension) -> Vec<String>;

    /// Current control value; empty means unset
    fn control_value(&self, dimension: FilterDimension) -> String;

    /// Change a control value
    fn set_control_value(&mut self, dimension: FilterDimension, value: &str);

    /// Show or hide row `index`
    fn set_row_visible(&mut self, index: usize, visible: bool);

    /// Show or hide date header `index`
    fn set_header_visible(&mut self, index: usize, visible: bool);

    /// Replace the result-count text
    fn set_count_text(&mut self, text: &str);

    /// Show or hide the no-results element
    fn set_no_results_visible(&mut self, visible: bool);

    /// Hide or reveal the load-more sentinel
    fn set_load_trigger_hidden(&mut self, hidden: bool);
}
