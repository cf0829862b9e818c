//! OParl Archive Viewer
//!
//! Library half of the `oparl-viewer` binary: renders papers into table rows
//! and implements the commands. Kept separate from `main.rs` so the commands
//! can be tested against an in-memory archive.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
pub mod render;

pub use commands::{
    facets, format_chunk_report, format_facets, format_table, load_config, open_archive,
    paper_detail, saved_searches, search_status, table, PaperDetail, SearchAction, Settings,
    TableReport, TableRequest,
};
pub use render::{date_group, memory_table, row_attributes, table_rows, RenderedRow};
