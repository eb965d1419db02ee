//! `sources`: show what discovery found.

use anyhow::Result;
use evidence_catalog::Catalog;

use super::output::{print_json, print_table};
use super::{open_gateway, ProjectArgs};

pub fn run(project: &ProjectArgs, json: bool) -> Result<()> {
    let gateway = open_gateway(project)?;
    let catalog = gateway.catalog();

    if json {
        return print_json(&serde_json::to_value(catalog.sources())?);
    }

    if catalog.is_empty() {
        println!("No data sources found in {}", catalog.root().display());
        return Ok(());
    }

    print_table(&["SOURCE", "TABLE", "VIEW", "COLUMNS", "FILE"], table_rows(catalog));
    println!(
        "{} sources, {} tables (discovered via {})",
        catalog.sources().len(),
        catalog.table_count(),
        catalog.origin().as_str()
    );
    Ok(())
}

fn table_rows(catalog: &Catalog) -> Vec<Vec<String>> {
    catalog
        .tables()
        .map(|(source, table)| {
            vec![
                source.name.clone(),
                table.name.clone(),
                format!("\"{}\"", evidence_catalog::view_name(&source.name, &table.name)),
                table.schema_fields.len().to_string(),
                table.data_file.display().to_string(),
            ]
        })
        .collect()
}
