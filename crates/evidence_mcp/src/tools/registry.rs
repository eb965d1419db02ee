//! Tool Registry - Tool Discovery and Dispatch
//!
//! Maintains the list of available tools and dispatches calls by name.

use super::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Registry of available MCP tools, ordered by name
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create a new tool registry with all tools registered
    pub fn new() -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
        };

        registry.register(Box::new(sources::ListSourcesTool));
        registry.register(Box::new(tables::ListTablesTool));
        registry.register(Box::new(describe::DescribeTableTool));
        registry.register(Box::new(query::QueryTool));

        debug!("Registered {} tools", registry.tools.len());

        registry
    }

    fn register(&mut self, tool: Box<dyn McpTool>) {
        debug!("Registering tool: {}", tool.name());
        self.tools.insert(tool.name(), tool);
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_all_tools() {
        let registry = ToolRegistry::new();

        assert!(registry.has_tool("evidence-list-sources"));
        assert!(registry.has_tool("evidence-list-tables"));
        assert!(registry.has_tool("evidence-describe-table"));
        assert!(registry.has_tool("evidence-query"));
        assert!(!registry.has_tool("evidence-drop-table"));
    }

    #[test]
    fn test_list_tools_sorted() {
        let registry = ToolRegistry::new();
        let names: Vec<_> = registry.list_tools().into_iter().map(|t| t.name).collect();

        assert_eq!(
            names,
            vec![
                "evidence-describe-table",
                "evidence-list-sources",
                "evidence-list-tables",
                "evidence-query",
            ]
        );
    }

    #[test]
    fn test_schemas_declare_required_params() {
        let registry = ToolRegistry::new();
        let describe = registry.get_tool("evidence-describe-table").unwrap();
        assert_eq!(
            describe.input_schema()["required"],
            serde_json::json!(["source", "table"])
        );

        let sources = registry.get_tool("evidence-list-sources").unwrap();
        assert_eq!(sources.input_schema()["required"], serde_json::json!([]));
    }
}
