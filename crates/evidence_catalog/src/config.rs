//! Data root resolution for an Evidence project.
//!
//! Priority:
//! 1. explicit `data_path` override (must exist)
//! 2. `<project>/.evidence/template/static/data`
//! 3. `<project>/sources`

use crate::error::{CatalogError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rendered data directory, relative to the project root.
pub const EVIDENCE_DATA_SUBPATH: &[&str] = &[".evidence", "template", "static", "data"];

/// Raw sources directory, relative to the project root.
pub const SOURCES_DIR: &str = "sources";

/// Where to look for Evidence data.
#[derive(Debug, Clone)]
pub struct Config {
    project_path: PathBuf,
    data_path: Option<PathBuf>,
}

impl Config {
    /// Create a configuration for a project root.
    ///
    /// Fails if the project directory does not exist.
    pub fn new(project_path: impl Into<PathBuf>, data_path: Option<PathBuf>) -> Result<Self> {
        let project_path = project_path.into();
        if !project_path.exists() {
            return Err(CatalogError::configuration(format!(
                "Project directory not found: {}",
                project_path.display()
            )));
        }
        Ok(Self {
            project_path,
            data_path,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn data_path_override(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// Conventional rendered-data location for this project.
    pub fn evidence_data_dir(&self) -> PathBuf {
        EVIDENCE_DATA_SUBPATH
            .iter()
            .fold(self.project_path.clone(), |path, segment| path.join(segment))
    }

    /// Resolve the directory discovery should scan.
    pub fn data_root(&self) -> Result<PathBuf> {
        if let Some(data_path) = &self.data_path {
            if data_path.exists() {
                debug!(path = %data_path.display(), "Using data path override");
                return Ok(data_path.clone());
            }
            return Err(CatalogError::configuration(format!(
                "Data directory not found: {}. Please provide a valid data directory.",
                data_path.display()
            )));
        }

        let evidence_data_dir = self.evidence_data_dir();
        if evidence_data_dir.exists() {
            debug!(path = %evidence_data_dir.display(), "Using rendered Evidence data directory");
            return Ok(evidence_data_dir);
        }

        let sources_dir = self.project_path.join(SOURCES_DIR);
        if sources_dir.exists() {
            debug!(path = %sources_dir.display(), "Using project sources directory");
            return Ok(sources_dir);
        }

        Err(CatalogError::configuration(format!(
            "Evidence data directory not found: {}. Please run 'npm run sources' in your \
             Evidence project first, or explicitly provide a data directory with --data-path.",
            evidence_data_dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_project_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let err = Config::new(tmp.path().join("nope"), None).unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
        assert!(err.to_string().contains("Project directory not found"));
    }

    #[test]
    fn override_wins_when_present() {
        let tmp = TempDir::new().unwrap();
        let custom = tmp.path().join("custom");
        fs::create_dir_all(&custom).unwrap();
        fs::create_dir_all(tmp.path().join(SOURCES_DIR)).unwrap();

        let config = Config::new(tmp.path(), Some(custom.clone())).unwrap();
        assert_eq!(config.data_root().unwrap(), custom);
    }

    #[test]
    fn missing_override_does_not_fall_back() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(SOURCES_DIR)).unwrap();

        let config = Config::new(tmp.path(), Some(tmp.path().join("missing"))).unwrap();
        let err = config.data_root().unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn rendered_data_dir_preferred_over_sources() {
        let tmp = TempDir::new().unwrap();
        let config = Config::new(tmp.path(), None).unwrap();
        fs::create_dir_all(config.evidence_data_dir()).unwrap();
        fs::create_dir_all(tmp.path().join(SOURCES_DIR)).unwrap();

        let root = config.data_root().unwrap();
        assert!(root.ends_with(".evidence/template/static/data"));
    }

    #[test]
    fn sources_dir_is_fallback() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(SOURCES_DIR)).unwrap();

        let config = Config::new(tmp.path(), None).unwrap();
        assert_eq!(config.data_root().unwrap(), tmp.path().join(SOURCES_DIR));
    }

    #[test]
    fn nothing_found_points_at_sources_step() {
        let tmp = TempDir::new().unwrap();
        let config = Config::new(tmp.path(), None).unwrap();

        let err = config.data_root().unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
        assert!(err.to_string().contains("npm run sources"));
    }
}
