//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// No project path on the command line or in the environment
    pub fn missing_project_path() -> Self {
        Self::new("No Evidence project given")
            .with_context("The server needs the root directory of an Evidence project")
            .with_suggestions([
                "TRY: mcp-evidence --project-path /path/to/evidence-project",
                "TRY: export EVIDENCE_PROJECT_PATH=/path/to/evidence-project",
            ])
    }

    /// Project or data directory could not be resolved
    pub fn configuration(message: impl Into<String>, project_path: &Path) -> Self {
        Self::new(message)
            .with_context(format!(
                "Looking for data under project {}",
                project_path.display()
            ))
            .with_suggestions([
                format!(
                    "TRY: Render the sources first: cd {} && npm run sources",
                    project_path.display()
                ),
                "TRY: Point at the data directly: --data-path /path/to/data".to_string(),
            ])
    }

    /// The SQL could not be run
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::new(format!("Query failed: {}", message.into()))
            .with_suggestions([
                "TRY: List tables with: mcp-evidence sources",
                "TRY: Quote view names, e.g. SELECT * FROM \"source_table\"",
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Text printed to stderr for a failed command.
pub fn render(err: &anyhow::Error) -> String {
    match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => helpful.to_string(),
        None => format!("ERROR: {:#}", err),
    }
}
