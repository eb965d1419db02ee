//! Source discovery strategies.
//!
//! Strategies are tried in order; the first one that yields at least one
//! source wins. Each strategy is a pure function of the data root and logs
//! and skips the entries it cannot use.

mod manifest;
mod scan;

use crate::model::{SchemaField, SourceMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub use manifest::MANIFEST_FILE;

/// Which strategy produced a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOrigin {
    Manifest,
    DirectoryScan,
}

impl DiscoveryOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryOrigin::Manifest => "manifest",
            DiscoveryOrigin::DirectoryScan => "directory scan",
        }
    }
}

struct Strategy {
    origin: DiscoveryOrigin,
    run: fn(&Path) -> Option<SourceMap>,
}

const STRATEGIES: &[Strategy] = &[
    Strategy {
        origin: DiscoveryOrigin::Manifest,
        run: manifest::discover,
    },
    Strategy {
        origin: DiscoveryOrigin::DirectoryScan,
        run: scan::discover,
    },
];

/// Run the strategies against `root`.
///
/// Returns the winning origin and its sources. When nothing is found the
/// directory scan is reported with an empty map.
pub fn discover(root: &Path) -> (DiscoveryOrigin, SourceMap) {
    for strategy in STRATEGIES {
        match (strategy.run)(root) {
            Some(sources) if !sources.is_empty() => {
                info!(
                    "Discovered {} sources from {}",
                    sources.len(),
                    strategy.origin.as_str()
                );
                return (strategy.origin, sources);
            }
            _ => debug!("No sources from {}", strategy.origin.as_str()),
        }
    }
    warn!(root = %root.display(), "No data sources discovered");
    (DiscoveryOrigin::DirectoryScan, SourceMap::new())
}

/// Discover using only the manifest strategy.
pub fn discover_from_manifest(root: &Path) -> Option<SourceMap> {
    manifest::discover(root)
}

/// Discover using only the directory scan strategy.
pub fn discover_from_directories(root: &Path) -> Option<SourceMap> {
    scan::discover(root)
}

/// Load a schema sidecar. Parse failures are logged and yield no fields.
pub(crate) fn load_schema_fields(path: &Path) -> Vec<SchemaField> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Error reading schema file {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<SchemaField>>(&contents) {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Error parsing schema file {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Dot-prefixed names are skipped during scans.
pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn schema_sidecar_parse_failure_yields_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.schema.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_schema_fields(&path).is_empty());

        fs::write(&path, r#"{"name":"id","type":"INTEGER"}"#).unwrap();
        assert!(load_schema_fields(&path).is_empty(), "object instead of array");
    }

    #[test]
    fn schema_sidecar_fields_keep_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.schema.json");
        fs::write(
            &path,
            r#"[{"name":"b","type":"VARCHAR"},{"name":"a","type":"INTEGER"}]"#,
        )
        .unwrap();
        let fields = load_schema_fields(&path);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn empty_root_discovers_nothing() {
        let tmp = TempDir::new().unwrap();
        let (origin, sources) = discover(tmp.path());
        assert_eq!(origin, DiscoveryOrigin::DirectoryScan);
        assert!(sources.is_empty());
    }
}
