//! Evidence data source catalog
//!
//! Locates the rendered data of an Evidence project and indexes it as
//! `source -> table -> {data file, schema sidecar}`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use evidence_catalog::{Catalog, Config};
//!
//! let config = Config::new("/path/to/project", None)?;
//! let catalog = Catalog::build(&config)?;
//!
//! for source in catalog.sources() {
//!     println!("{}: {:?}", source.name, source.tables);
//! }
//! let fields = catalog.table_schema("sales", "orders")?;
//! ```
//!
//! Discovery tries `manifest.json` first and falls back to scanning the
//! directory tree. Per-entry problems (unreadable manifest, bad schema
//! sidecar, missing data file) are logged and skipped.

mod catalog;
mod config;
mod error;
mod model;

pub mod discovery;

pub use catalog::Catalog;
pub use config::{Config, EVIDENCE_DATA_SUBPATH, SOURCES_DIR};
pub use discovery::{DiscoveryOrigin, MANIFEST_FILE};
pub use error::{CatalogError, Result};
pub use model::{
    view_name, SchemaField, Source, SourceMap, SourceSummary, Table, TableKind, TableRef,
    PARQUET_EXTENSION, SCHEMA_SUFFIX, SQL_EXTENSION,
};
