//! OParl Archive Data
//!
//! The data resolution layer of the archive: one [`Archive`] context per
//! deployment, pure per-paper resolvers and facet derivation.
//!
//! # Example
//!
//! ```rust,ignore
//! use oparl_data::{Archive, ArchiveConfig};
//!
//! let archive = Archive::over_http(ArchiveConfig::default().with_env()?)?;
//! let papers = archive.load_papers().await;
//! let facets = archive.filter_data().await;
//!
//! let resolution = archive.resolution().await;
//! for consultation in resolution.consultations(&papers[0]) {
//!     println!("{:?}", consultation.result());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod archive;
pub mod config;
pub mod facets;
pub mod resolve;

pub use archive::{Archive, DataIssue, DetailPath};
pub use config::{ArchiveConfig, ConfigError, DEFAULT_BASE_URL};
pub use facets::{
    FacetBuilder, FilterData, PaperFilterData, PaperFilterOptions, ResultIndex, NO_VALUE,
    NO_VALUES,
};
pub use resolve::{
    resolve_consultations, resolve_files, resolve_organizations, Resolution,
    ResolvedConsultation, ResolvedFile,
};
