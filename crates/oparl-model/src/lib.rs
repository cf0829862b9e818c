//! OParl Archive Model
//!
//! Immutable entity types for the council archive and the fields derived from
//! them.
//!
//! # Core Concepts
//!
//! - [`Paper`]: A council document with its consultations and attached files
//! - [`Meeting`]: A sitting of a body with its embedded [`AgendaItem`]s
//! - [`Organization`]: A body that papers are directed by
//! - [`FileContent`]: Extraction metadata whose text may arrive later
//! - [`Districts`]: Normalized set of city districts ("Stadtteile")
//!
//! # Example
//!
//! ```rust,ignore
//! use oparl_model::{internal_reference, Paper};
//!
//! let paper: Paper = serde_json::from_str(json)?;
//! assert_eq!(internal_reference("2024/0815"), "2024-0815");
//! println!("Year bucket: {}", paper.relevant_year());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod de;
mod districts;
mod entity;
mod file;
mod format;
mod meeting;
mod organization;
mod paper;

// Re-exports
pub use districts::{Districts, FILTER_VALUE_SEPARATOR};
pub use entity::Entity;
pub use file::{AuxiliaryFile, ChunkRecord, FileContent, TextSlot, TextState};
pub use format::{correct_url, format_date_long, format_date_short};
pub use meeting::{AgendaItem, Location, Meeting};
pub use organization::Organization;
pub use paper::{internal_reference, relevant_year, Consultation, Paper, BULK_MODIFIED_DATE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
