//! Query gateway over the catalog.
//!
//! Each query runs in its own [`QuerySession`]: a throwaway in-memory
//! database with one view per cataloged table. Sessions are never shared,
//! so views registered for one call are invisible to every other call.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use evidence_catalog::{view_name, Catalog, SchemaField, Source, Table, TableKind, TableRef};
use tracing::{debug, info_span, warn};

use crate::backend::{quote_ident, quote_literal, DbConnection, QueryResult};
use crate::error::{QueryError, Result};

/// Row cap for table previews.
pub const DEFAULT_PREVIEW_LIMIT: usize = 100;

/// Read-only entry point for listing, describing and querying tables.
#[derive(Debug, Clone)]
pub struct QueryGateway {
    catalog: Arc<Catalog>,
}

impl QueryGateway {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every (source, table) pair. Does not touch the engine.
    pub fn list_tables(&self) -> Vec<TableRef> {
        self.catalog.table_refs()
    }

    /// Schema sidecar fields of a table.
    pub fn describe_table(&self, source: &str, table: &str) -> Result<Vec<SchemaField>> {
        Ok(self.catalog.table_schema(source, table)?.to_vec())
    }

    /// Run caller-supplied SQL against a fresh session with every table
    /// registered as a view.
    pub fn run_query(&self, sql: &str) -> Result<QueryResult> {
        let span = info_span!("gateway.run_query", tables = self.catalog.table_count());
        let _guard = span.enter();

        let session = QuerySession::open(&self.catalog)?;
        session.query(sql)
    }

    /// First `limit` rows of one table.
    ///
    /// Fails with [`QueryError::ViewCollision`] when another table owns the
    /// view name this one composes to.
    pub fn preview_table(&self, source: &str, table: &str, limit: usize) -> Result<QueryResult> {
        self.catalog.table(source, table)?;
        let view = view_name(source, table);
        if let Some((owner_source, owner_table)) = view_owner(&self.catalog, &view) {
            if owner_source.name != source || owner_table.name != table {
                return Err(QueryError::ViewCollision {
                    view,
                    source_name: source.to_string(),
                    table: table.to_string(),
                    owner_source: owner_source.name.clone(),
                    owner_table: owner_table.name.clone(),
                });
            }
        }
        let sql = format!("SELECT * FROM {} LIMIT {}", quote_ident(&view), limit);
        self.run_query(&sql)
    }
}

/// One engine session with the catalog's views registered.
///
/// The database is released when the session is dropped, on success and
/// error paths alike.
pub struct QuerySession {
    conn: Option<DbConnection>,
    registered: usize,
    skipped: usize,
}

impl QuerySession {
    /// Open an in-memory database and register a view per cataloged table.
    ///
    /// A table that fails to register is logged and left out; the rest of
    /// the session is unaffected.
    pub fn open(catalog: &Catalog) -> Result<Self> {
        let conn = DbConnection::open_in_memory()
            .map_err(|e| QueryError::Session(e.engine_message()))?;
        let mut session = Self {
            conn: Some(conn),
            registered: 0,
            skipped: 0,
        };

        let mut owners: HashMap<String, (&str, &str)> = HashMap::new();
        for (source, table) in catalog.tables() {
            let view = view_name(&source.name, &table.name);
            if let Some((owner_source, owner_table)) = owners.get(view.as_str()) {
                session.skipped += 1;
                warn!(
                    view = %view,
                    source = %source.name,
                    table = %table.name,
                    owner_source = %owner_source,
                    owner_table = %owner_table,
                    "View name collision, keeping the first table"
                );
                continue;
            }
            owners.insert(view, (source.name.as_str(), table.name.as_str()));

            match session.register(&source.name, table) {
                Ok(()) => session.registered += 1,
                Err(err) => {
                    session.skipped += 1;
                    warn!(
                        source = %source.name,
                        table = %table.name,
                        file = %table.data_file.display(),
                        error = %err,
                        "Skipping view registration"
                    );
                }
            }
        }

        debug!(
            registered = session.registered,
            skipped = session.skipped,
            "Query session ready"
        );
        Ok(session)
    }

    pub fn registered(&self) -> usize {
        self.registered
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Execute SQL verbatim.
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        self.connection()?.query(sql).map_err(QueryError::execution)
    }

    fn register(&self, source: &str, table: &Table) -> Result<()> {
        let sql = view_statement(source, table)?;
        self.connection()?
            .execute_batch(&sql)
            .map_err(QueryError::execution)
    }

    fn connection(&self) -> Result<&DbConnection> {
        self.conn
            .as_ref()
            .ok_or_else(|| QueryError::Session("session already closed".to_string()))
    }
}

impl Drop for QuerySession {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(err) = conn.close() {
                warn!(error = %err, "Failed to close query session");
            }
        }
    }
}

/// First table in catalog order whose view name is `view`.
fn view_owner<'a>(catalog: &'a Catalog, view: &str) -> Option<(&'a Source, &'a Table)> {
    catalog
        .tables()
        .find(|(source, table)| view_name(&source.name, &table.name) == view)
}

/// `CREATE VIEW` statement for one table, with the view name and file path
/// both quoted.
fn view_statement(source: &str, table: &Table) -> Result<String> {
    let view = quote_ident(&view_name(source, &table.name));
    match table.kind {
        TableKind::Parquet => {
            let path = table.data_file.to_string_lossy();
            Ok(format!(
                "CREATE VIEW {} AS SELECT * FROM read_parquet({})",
                view,
                quote_literal(&path)
            ))
        }
        TableKind::SqlScript => {
            let script = fs::read_to_string(&table.data_file)?;
            let body = script.trim().trim_end_matches(';').trim_end();
            if body.is_empty() {
                return Err(QueryError::Execution(format!(
                    "SQL script is empty: {}",
                    table.data_file.display()
                )));
            }
            Ok(format!("CREATE VIEW {} AS {}", view, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parquet_view_statement_quotes_name_and_path() {
        let table = Table::new(
            "referral_codes copy",
            PathBuf::from("/data/o'neil/referral_codes copy.parquet"),
            None,
            Vec::new(),
        );
        let sql = view_statement("maniac_neon_prod", &table).unwrap();
        assert_eq!(
            sql,
            "CREATE VIEW \"maniac_neon_prod_referral_codes copy\" AS \
             SELECT * FROM read_parquet('/data/o''neil/referral_codes copy.parquet')"
        );
    }

    #[test]
    fn sql_script_view_strips_trailing_semicolon() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("orders.sql");
        fs::write(&path, "select 1 as id;\n").unwrap();
        let table = Table::new("orders", path, None, Vec::new());

        let sql = view_statement("neon", &table).unwrap();
        assert_eq!(sql, "CREATE VIEW \"neon_orders\" AS select 1 as id");
    }

    #[test]
    fn empty_sql_script_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("blank.sql");
        fs::write(&path, " ;\n").unwrap();
        let table = Table::new("blank", path, None, Vec::new());

        assert!(view_statement("neon", &table).is_err());
    }
}
