//! DuckDB connection wrapper.
//!
//! Every connection is a private in-memory database; nothing is persisted.
//! The engine reads parquet files in place through `read_parquet`.

use std::time::Instant;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::value::{DbRow, DbTimestamp, DbValue, FromDbValue};

/// Errors from database backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),
}

impl BackendError {
    /// The underlying message without this crate's prefix.
    pub fn engine_message(&self) -> String {
        match self {
            BackendError::DuckDb(e) => e.to_string(),
            BackendError::Database(m)
            | BackendError::Query(m)
            | BackendError::TypeConversion(m)
            | BackendError::InvalidInput(m) => m.clone(),
        }
    }
}

/// Result set with column names in engine order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<DbRow>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows as name-keyed JSON objects.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| row.to_json_record(&self.columns))
            .collect()
    }
}

/// An in-memory DuckDB session. Dropping it releases the database.
pub struct DbConnection {
    conn: duckdb::Connection,
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection")
            .field("backend", &"DuckDB")
            .field("mode", &"in-memory")
            .finish()
    }
}

impl DbConnection {
    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = duckdb::Connection::open_in_memory()?;
        debug!("Opened in-memory DuckDB database");
        Ok(Self { conn })
    }

    /// Execute one or more statements, discarding any results.
    pub fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        let sql_hash = hash_sql(sql);
        let span = debug_span!(
            "db.exec_batch",
            op = sql_op_name(sql),
            sql_hash = %sql_hash,
            duration_ms = tracing::field::Empty
        );
        let _guard = span.enter();
        let start = Instant::now();
        self.conn.execute_batch(sql)?;
        span.record("duration_ms", start.elapsed().as_millis() as u64);
        Ok(())
    }

    /// Run a statement and collect every row.
    pub fn query(&self, sql: &str) -> Result<QueryResult, BackendError> {
        let sql_hash = hash_sql(sql);
        let span = debug_span!(
            "db.query",
            op = sql_op_name(sql),
            sql_hash = %sql_hash,
            duration_ms = tracing::field::Empty
        );
        let _guard = span.enter();
        let start = Instant::now();

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows_iter = stmt.query([])?;

        let columns: Vec<String> = match rows_iter.as_ref() {
            Some(stmt_ref) => (0..stmt_ref.column_count())
                .map(|i| {
                    stmt_ref
                        .column_name(i)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|_| format!("column{}", i))
                })
                .collect(),
            None => return Ok(QueryResult::default()),
        };

        let mut rows = Vec::new();
        while let Some(row) = rows_iter.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(duckdb_value_to_db_value(row, i)?);
            }
            rows.push(DbRow::new(values));
        }

        span.record("duration_ms", start.elapsed().as_millis() as u64);
        Ok(QueryResult { columns, rows })
    }

    /// Query and return a single scalar value.
    pub fn query_scalar<T: FromDbValue>(&self, sql: &str) -> Result<T, BackendError> {
        let result = self.query(sql)?;
        result
            .rows
            .first()
            .ok_or_else(|| BackendError::Query("Expected one row, got none".to_string()))?
            .get(0)
    }

    /// Close explicitly, surfacing any engine error from shutdown.
    pub fn close(self) -> Result<(), BackendError> {
        self.conn.close().map_err(|(_, e)| BackendError::from(e))?;
        debug!("Closed in-memory DuckDB database");
        Ok(())
    }
}

fn duckdb_value_to_db_value(row: &duckdb::Row, index: usize) -> Result<DbValue, duckdb::Error> {
    use duckdb::types::{TimeUnit, ValueRef};

    fn to_micros(unit: TimeUnit, v: i64) -> i64 {
        match unit {
            TimeUnit::Second => v * 1_000_000,
            TimeUnit::Millisecond => v * 1_000,
            TimeUnit::Microsecond => v,
            TimeUnit::Nanosecond => v / 1_000,
        }
    }

    match row.get_ref(index)? {
        ValueRef::Null => Ok(DbValue::Null),
        ValueRef::Boolean(v) => Ok(DbValue::Boolean(v)),
        ValueRef::TinyInt(v) => Ok(DbValue::Integer(v as i64)),
        ValueRef::SmallInt(v) => Ok(DbValue::Integer(v as i64)),
        ValueRef::Int(v) => Ok(DbValue::Integer(v as i64)),
        ValueRef::BigInt(v) => Ok(DbValue::Integer(v)),
        ValueRef::HugeInt(v) => Ok(i64::try_from(v)
            .map(DbValue::Integer)
            .unwrap_or_else(|_| DbValue::Numeric(v.to_string()))),
        ValueRef::UTinyInt(v) => Ok(DbValue::Integer(v as i64)),
        ValueRef::USmallInt(v) => Ok(DbValue::Integer(v as i64)),
        ValueRef::UInt(v) => Ok(DbValue::Integer(v as i64)),
        ValueRef::UBigInt(v) => Ok(i64::try_from(v)
            .map(DbValue::Integer)
            .unwrap_or_else(|_| DbValue::Numeric(v.to_string()))),
        ValueRef::Float(v) => Ok(DbValue::Real(v as f64)),
        ValueRef::Double(v) => Ok(DbValue::Real(v)),
        ValueRef::Decimal(v) => Ok(DbValue::Numeric(v.to_string())),
        ValueRef::Text(v) => Ok(DbValue::Text(String::from_utf8_lossy(v).to_string())),
        ValueRef::Blob(v) => Ok(DbValue::Blob(v.to_vec())),
        ValueRef::Timestamp(unit, v) => {
            let micros = to_micros(unit, v);
            Ok(DbTimestamp::from_unix_micros(micros)
                .map(DbValue::Timestamp)
                .unwrap_or(DbValue::Integer(micros)))
        }
        ValueRef::Date32(days) => {
            if let Some(date) = chrono::NaiveDate::from_num_days_from_ce_opt(719163 + days) {
                Ok(DbValue::Text(date.format("%Y-%m-%d").to_string()))
            } else {
                Ok(DbValue::Integer(days as i64))
            }
        }
        ValueRef::Time64(unit, v) => {
            let micros = to_micros(unit, v);
            let secs = (micros / 1_000_000) as u32;
            let nanos = ((micros % 1_000_000) * 1_000) as u32;
            if let Some(time) = chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
            {
                Ok(DbValue::Text(time.format("%H:%M:%S%.6f").to_string()))
            } else {
                Ok(DbValue::Integer(micros))
            }
        }
        ValueRef::Interval {
            months,
            days,
            nanos,
        } => Ok(DbValue::Text(format!("P{}M{}DT{}N", months, days, nanos))),
        other => {
            debug!(
                "DuckDB type {:?} at column {} mapped to debug string",
                std::mem::discriminant(&other),
                index
            );
            Ok(DbValue::Text(format!("{:?}", other)))
        }
    }
}

/// Quote an identifier: wrap in `"` and double embedded quotes.
pub fn quote_ident(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push('"');
    for ch in name.chars() {
        if ch == '"' {
            escaped.push('"');
        }
        escaped.push(ch);
    }
    escaped.push('"');
    escaped
}

/// Quote a string literal: wrap in `'` and double embedded quotes.
pub fn quote_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            escaped.push('\'');
        }
        escaped.push(ch);
    }
    escaped.push('\'');
    escaped
}

fn sql_op_name(sql: &str) -> &str {
    sql.split_whitespace().next().unwrap_or("unknown")
}

fn hash_sql(sql: &str) -> String {
    // FNV-1a 64-bit hash for low-cardinality, stable identification.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in sql.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{:016x}", hash)
}
