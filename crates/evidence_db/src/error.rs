//! Errors surfaced by the query gateway.

use evidence_catalog::CatalogError;
use thiserror::Error;

use crate::backend::BackendError;

/// Query gateway result type.
pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Unknown source or table, passed through from the catalog unchanged
    #[error(transparent)]
    NotFound(#[from] CatalogError),

    /// The engine rejected or failed the SQL; carries the engine message
    #[error("{0}")]
    Execution(String),

    /// Two tables compose to the same view name; the first in catalog order
    /// owns it
    #[error(
        "View \"{view}\" for {source_name}.{table} is taken by {owner_source}.{owner_table}"
    )]
    ViewCollision {
        view: String,
        source_name: String,
        table: String,
        owner_source: String,
        owner_table: String,
    },

    /// The engine session could not be opened
    #[error("Query session error: {0}")]
    Session(String),

    /// Reading a SQL script for a view definition failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn execution(err: BackendError) -> Self {
        Self::Execution(err.engine_message())
    }
}

impl From<BackendError> for QueryError {
    fn from(err: BackendError) -> Self {
        Self::execution(err)
    }
}
