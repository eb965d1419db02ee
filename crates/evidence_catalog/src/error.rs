//! Error types for catalog construction and lookup.

use thiserror::Error;

/// Catalog operation result type.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The data root cannot be resolved or read. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown source or table name
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error (file system operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest or schema sidecar could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Unknown source.
    pub fn source_not_found(source: &str) -> Self {
        Self::NotFound(format!("Source not found: {}", source))
    }

    /// Unknown table within a known source.
    pub fn table_not_found(source: &str, table: &str) -> Self {
        Self::NotFound(format!("Table not found: {} in source {}", table, source))
    }

    /// True for lookups of unknown names.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
