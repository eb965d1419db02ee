//! Tool error type shared by every tool.

use evidence_catalog::CatalogError;
use evidence_db::QueryError;
use thiserror::Error;

/// Errors that can occur during tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid parameters provided to the tool
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Unknown source or table
    #[error("{0}")]
    NotFound(String),

    /// The engine rejected or failed the query
    #[error("{0}")]
    ExecutionFailed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Get the JSON-RPC error code for this error type
    pub fn error_code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => -32602,   // Invalid params
            ToolError::NotFound(_) => -32001,        // Custom: not found
            ToolError::ExecutionFailed(_) => -32002, // Custom: execution failed
            ToolError::Internal(_) => -32603,        // Internal error
            ToolError::Serialization(_) => -32603,   // Internal error
        }
    }

    /// Caller supplied bad arguments; reported as a protocol error rather
    /// than a tool result.
    pub fn is_invalid_params(&self) -> bool {
        matches!(self, ToolError::InvalidParams(_))
    }
}

impl From<CatalogError> for ToolError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(msg) => ToolError::NotFound(msg),
            other => ToolError::Internal(other.to_string()),
        }
    }
}

impl From<QueryError> for ToolError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound(inner) => inner.into(),
            QueryError::Execution(msg) => ToolError::ExecutionFailed(msg),
            collision @ QueryError::ViewCollision { .. } => {
                ToolError::ExecutionFailed(collision.to_string())
            }
            other => ToolError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_is_bare() {
        let err: ToolError = CatalogError::source_not_found("nonexistent").into();
        assert_eq!(err.to_string(), "Source not found: nonexistent");
        assert_eq!(err.error_code(), -32001);
    }

    #[test]
    fn test_query_errors_map_by_kind() {
        let err: ToolError = QueryError::Execution("Catalog Error: nope".into()).into();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
        assert_eq!(err.to_string(), "Catalog Error: nope");

        let err: ToolError =
            QueryError::NotFound(CatalogError::table_not_found("sales", "ghost")).into();
        assert_eq!(err.to_string(), "Table not found: ghost in source sales");
    }
}
