//! The immutable catalog built once at startup.

use crate::config::Config;
use crate::discovery::{self, DiscoveryOrigin};
use crate::error::{CatalogError, Result};
use crate::model::{SchemaField, Source, SourceMap, SourceSummary, Table, TableRef};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Source name -> Source, read-only after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    origin: DiscoveryOrigin,
    sources: SourceMap,
}

impl Catalog {
    /// Resolve the data root from `config` and build the catalog.
    pub fn build(config: &Config) -> Result<Self> {
        let root = config.data_root()?;
        Self::build_from_root(root)
    }

    /// Build the catalog from an already resolved data root.
    ///
    /// Only an unreadable root fails; bad entries below it are skipped.
    pub fn build_from_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CatalogError::configuration(format!(
                "Data directory is not a directory: {}",
                root.display()
            )));
        }
        fs::read_dir(&root).map_err(|e| {
            CatalogError::configuration(format!(
                "Data directory {} cannot be read: {}",
                root.display(),
                e
            ))
        })?;

        let (origin, sources) = discovery::discover(&root);
        let catalog = Self {
            root,
            origin,
            sources,
        };
        info!(
            root = %catalog.root.display(),
            sources = catalog.sources.len(),
            tables = catalog.table_count(),
            origin = origin.as_str(),
            "Catalog built"
        );
        Ok(catalog)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn origin(&self) -> DiscoveryOrigin {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.sources.values().map(|s| s.tables.len()).sum()
    }

    /// All sources with their table names, sorted by name.
    pub fn sources(&self) -> Vec<SourceSummary> {
        self.sources.values().map(SourceSummary::from).collect()
    }

    /// Look up a source by name.
    pub fn source(&self, source: &str) -> Result<&Source> {
        self.sources
            .get(source)
            .ok_or_else(|| CatalogError::source_not_found(source))
    }

    /// Table names of one source.
    pub fn source_tables(&self, source: &str) -> Result<Vec<String>> {
        Ok(self.source(source)?.table_names())
    }

    /// Look up a table within a source.
    pub fn table(&self, source: &str, table: &str) -> Result<&Table> {
        self.source(source)?
            .tables
            .get(table)
            .ok_or_else(|| CatalogError::table_not_found(source, table))
    }

    /// Schema sidecar fields of a table (empty when it had none).
    pub fn table_schema(&self, source: &str, table: &str) -> Result<&[SchemaField]> {
        Ok(&self.table(source, table)?.schema_fields)
    }

    /// Data file backing a table.
    pub fn data_file(&self, source: &str, table: &str) -> Result<&Path> {
        Ok(&self.table(source, table)?.data_file)
    }

    /// Every (source, table) pair.
    pub fn table_refs(&self) -> Vec<TableRef> {
        self.tables()
            .map(|(source, table)| TableRef {
                source: source.name.clone(),
                table: table.name.clone(),
            })
            .collect()
    }

    /// Iterate tables with their owning source.
    pub fn tables(&self) -> impl Iterator<Item = (&Source, &Table)> {
        self.sources
            .values()
            .flat_map(|source| source.tables.values().map(move |table| (source, table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sales_root() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("sales/orders");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("orders.parquet"), b"PAR1").unwrap();
        fs::write(
            dir.join("orders.schema.json"),
            r#"[{"name":"id","type":"INTEGER"}]"#,
        )
        .unwrap();
        tmp
    }

    #[test]
    fn accessors_on_known_names() {
        let tmp = sales_root();
        let catalog = Catalog::build_from_root(tmp.path()).unwrap();

        let sources = catalog.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "sales");
        assert_eq!(sources[0].tables, vec!["orders"]);
        assert!(sources[0].path.ends_with("sales"));

        assert_eq!(catalog.source_tables("sales").unwrap(), vec!["orders"]);
        assert_eq!(
            catalog.table_schema("sales", "orders").unwrap(),
            &[SchemaField::new("id", "INTEGER")]
        );
        assert!(catalog.data_file("sales", "orders").unwrap().exists());
        assert_eq!(
            catalog.table_refs(),
            vec![TableRef {
                source: "sales".into(),
                table: "orders".into()
            }]
        );
    }

    #[test]
    fn unknown_names_are_not_found() {
        let tmp = sales_root();
        let catalog = Catalog::build_from_root(tmp.path()).unwrap();

        let err = catalog.source_tables("nonexistent").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nonexistent"));

        let err = catalog.table_schema("sales", "ghost").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains("sales"));

        assert!(catalog.data_file("nope", "orders").unwrap_err().is_not_found());
    }

    #[test]
    fn root_must_be_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            Catalog::build_from_root(&file),
            Err(CatalogError::Configuration(_))
        ));
        assert!(matches!(
            Catalog::build_from_root(tmp.path().join("missing")),
            Err(CatalogError::Configuration(_))
        ));
    }
}
