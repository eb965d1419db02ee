//! Query execution for the Evidence catalog.
//!
//! Wraps an embedded DuckDB engine. Every call gets its own in-memory
//! session in which each cataloged table is registered as a view named
//! `"{source}_{table}"`; the session is discarded when the call returns.
//!
//! ```rust,ignore
//! use evidence_db::QueryGateway;
//!
//! let gateway = QueryGateway::new(Arc::new(catalog));
//! let result = gateway.run_query(r#"SELECT COUNT(*) FROM "sales_orders""#)?;
//! ```

mod backend;
mod error;
mod gateway;
mod value;

pub use backend::{quote_ident, quote_literal, BackendError, DbConnection, QueryResult};
pub use error::{QueryError, Result};
pub use gateway::{QueryGateway, QuerySession, DEFAULT_PREVIEW_LIMIT};
pub use value::{DbRow, DbTimestamp, DbValue, FromDbValue};
