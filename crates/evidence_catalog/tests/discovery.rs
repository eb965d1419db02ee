//! Discovery behavior against realistic project layouts.

use evidence_catalog::discovery::{discover_from_directories, discover_from_manifest};
use evidence_catalog::{Catalog, CatalogError, Config, DiscoveryOrigin, TableKind, MANIFEST_FILE};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn rendered_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join(".evidence/template/static/data");
    write(&data.join("sales/orders/orders.parquet"), "PAR1");
    write(
        &data.join("sales/orders/orders.schema.json"),
        r#"[{"name":"id","type":"INTEGER"},{"name":"total","type":"DOUBLE"}]"#,
    );
    write(&data.join("sales/customers/customers.parquet"), "PAR1");
    write(
        &data.join("maniac_neon_prod/referral_codes copy/referral_codes copy.parquet"),
        "PAR1",
    );
    tmp
}

#[test]
fn build_from_project_uses_rendered_data_dir() {
    let project = rendered_project();
    let config = Config::new(project.path(), None).unwrap();
    let catalog = Catalog::build(&config).unwrap();

    assert_eq!(catalog.origin(), DiscoveryOrigin::DirectoryScan);
    assert_eq!(catalog.table_count(), 3);
    assert_eq!(
        catalog.source_tables("maniac_neon_prod").unwrap(),
        vec!["referral_codes copy"]
    );
    let fields = catalog.table_schema("sales", "orders").unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].data_type, "DOUBLE");
}

#[test]
fn manifest_declares_subset_of_directories() {
    let project = rendered_project();
    let data = project.path().join(".evidence/template/static/data");
    write(
        &data.join(MANIFEST_FILE),
        r#"{"renderedFiles": {
            "sales": ["static/data/sales/orders/orders.parquet",
                      "static/data/sales/gone/gone.parquet"]
        }}"#,
    );

    let catalog = Catalog::build_from_root(&data).unwrap();
    assert_eq!(catalog.origin(), DiscoveryOrigin::Manifest);
    assert_eq!(catalog.source_tables("sales").unwrap(), vec!["orders"]);
    assert!(catalog.source("maniac_neon_prod").unwrap_err().is_not_found());
}

#[test]
fn rendered_files_survive_malformed_sources_key() {
    let project = rendered_project();
    let data = project.path().join(".evidence/template/static/data");
    write(
        &data.join(MANIFEST_FILE),
        r#"{"renderedFiles": {"sales": ["static/data/sales/orders/orders.parquet"]},
            "sources": {"x": {"tables": ["a"]}}}"#,
    );

    let catalog = Catalog::build_from_root(&data).unwrap();
    assert_eq!(catalog.origin(), DiscoveryOrigin::Manifest);
    assert_eq!(catalog.table_count(), 1);
    assert_eq!(catalog.source_tables("sales").unwrap(), vec!["orders"]);
}

#[test]
fn broken_manifest_falls_back_to_directory_scan() {
    let project = rendered_project();
    let data = project.path().join(".evidence/template/static/data");
    let scanned = discover_from_directories(&data).unwrap();

    write(&data.join(MANIFEST_FILE), "{ this is not json");
    assert!(discover_from_manifest(&data).is_none());

    let catalog = Catalog::build_from_root(&data).unwrap();
    assert_eq!(catalog.origin(), DiscoveryOrigin::DirectoryScan);
    let names: Vec<_> = catalog.sources().into_iter().map(|s| s.name).collect();
    assert_eq!(names, scanned.keys().cloned().collect::<Vec<_>>());
    for (source, table) in catalog.tables() {
        assert_eq!(&scanned[&source.name].tables[&table.name], table);
    }
}

#[test]
fn manifest_with_no_reachable_tables_falls_back() {
    let project = rendered_project();
    let data = project.path().join(".evidence/template/static/data");
    write(
        &data.join(MANIFEST_FILE),
        r#"{"sources": {"ghost": {"tables": {"nothing": {}}}}}"#,
    );

    let catalog = Catalog::build_from_root(&data).unwrap();
    assert_eq!(catalog.origin(), DiscoveryOrigin::DirectoryScan);
    assert_eq!(catalog.sources().len(), 2);
}

#[test]
fn every_cataloged_data_file_exists() {
    let project = rendered_project();
    let config = Config::new(project.path(), None).unwrap();
    let catalog = Catalog::build(&config).unwrap();

    for table_ref in catalog.table_refs() {
        let path = catalog.data_file(&table_ref.source, &table_ref.table).unwrap();
        assert!(path.exists(), "{} should exist", path.display());
    }
}

#[test]
fn raw_sources_project_uses_sql_scripts() {
    let tmp = TempDir::new().unwrap();
    write(
        &tmp.path().join("sources/maniac_neon/orders.sql"),
        "select 1 as id",
    );
    write(
        &tmp.path().join("sources/maniac_neon/connection.yaml"),
        "type: postgres",
    );

    let config = Config::new(tmp.path(), None).unwrap();
    let catalog = Catalog::build(&config).unwrap();
    let table = catalog.table("maniac_neon", "orders").unwrap();
    assert_eq!(table.kind, TableKind::SqlScript);
    assert!(table.data_file.ends_with("orders.sql"));
    assert!(catalog.table_schema("maniac_neon", "orders").unwrap().is_empty());
}

#[test]
fn missing_data_dir_is_configuration_error() {
    let tmp = TempDir::new().unwrap();
    let config = Config::new(tmp.path(), None).unwrap();
    let err = Catalog::build(&config).unwrap_err();
    assert!(matches!(err, CatalogError::Configuration(_)));
}
