//! # fginspect
//!
//! Inspect an ESRI File Geodatabase and write a plain-text report of its
//! schema: feature datasets, feature classes, tables, fields, domains,
//! subtypes and relationship classes.
//!
//! Metadata is read through the [`Workspace`] trait. The bundled
//! [`CatalogWorkspace`] reads the catalog snapshot stored in the
//! geodatabase directory; any other geospatial SDK binding can implement
//! the trait instead.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fginspect::{Environment, ReportGenerator};
//!
//! let env = Environment::new("data/roads.gdb");
//! let generator = ReportGenerator::open(env)?;
//! let report = generator.process()?;
//! println!("wrote {}", report.display());
//! # Ok::<(), fginspect::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod env;
pub mod error;
pub mod layout;
pub mod model;
pub mod report;
pub mod workspace;

// Re-exports for convenience
pub use catalog::{CatalogSnapshot, CatalogWorkspace};
pub use env::{report_path_for, Environment};
pub use error::{Error, ItemFailure, ItemResult, Result};
pub use report::ReportGenerator;
pub use workspace::Workspace;

/// Version of the fginspect library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
