//! CLI command implementations

pub mod error;
pub mod output;
pub mod query;
pub mod serve;
pub mod sources;

use anyhow::Result;
use evidence_catalog::{Catalog, CatalogError, Config};
use evidence_db::QueryGateway;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use error::HelpfulError;

/// Project location flags shared by every command.
#[derive(Debug, Clone)]
pub struct ProjectArgs {
    pub project_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

/// Resolve the project, discover its data and wrap it in a gateway.
///
/// Configuration problems come back as [`HelpfulError`]s.
pub fn open_gateway(args: &ProjectArgs) -> Result<QueryGateway> {
    let project_path = args
        .project_path
        .clone()
        .ok_or_else(HelpfulError::missing_project_path)?;

    let config = Config::new(&project_path, args.data_path.clone())
        .map_err(|e| configuration_error(e, &project_path))?;
    let catalog = Catalog::build(&config).map_err(|e| configuration_error(e, &project_path))?;

    info!(
        project = %project_path.display(),
        data_root = %catalog.root().display(),
        "Evidence project loaded"
    );
    if catalog.is_empty() {
        tracing::warn!(
            root = %catalog.root().display(),
            "No data sources found; every listing will be empty"
        );
    }

    Ok(QueryGateway::new(Arc::new(catalog)))
}

fn configuration_error(err: CatalogError, project_path: &std::path::Path) -> anyhow::Error {
    match err {
        CatalogError::Configuration(message) => {
            HelpfulError::configuration(message, project_path).into()
        }
        other => other.into(),
    }
}
