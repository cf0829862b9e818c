//! OParl Archive Filter
//!
//! Incremental filtering and pagination over a server-rendered paper table.
//!
//! # Core Concepts
//!
//! - [`TableDom`]: Read rows and controls of a container, toggle visibility
//! - [`PapersTable`]: The engine; indexes rows once and applies filters with
//!   minimal visibility writes
//! - [`FilterState`]: Selected value per [`FilterDimension`]
//! - [`History`]: Keeps the selected year in the page URL
//!
//! # Example
//!
//! ```rust,ignore
//! use oparl_filter::{FilterDimension, MemoryHistory, MemoryTable, PapersTable, TableOptions};
//!
//! let dom = MemoryTable::new(rows).with_controls_from_rows();
//! let history = MemoryHistory::new("https://example.org/vorlagen?jahr=2024");
//! let mut table = PapersTable::init(dom, history, TableOptions::default())?;
//!
//! table.on_animation_frame();
//! table.set_filter(FilterDimension::Type, Some("Antrag"));
//! while table.load_next_rows().is_some() {}
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod dimension;
pub mod dom;
pub mod history;
pub mod memory;
pub mod row;
pub mod table;

pub use dimension::{FilterDimension, FilterState};
pub use dom::TableDom;
pub use history::{History, MemoryHistory};
pub use memory::MemoryTable;
pub use row::{PaperRow, RowAttributes};
pub use table::{
    FilterError, FilterPass, PapersTable, TableOptions, INITIAL_PAPERS_BATCH_SIZE,
    YEAR_QUERY_PARAM,
};
