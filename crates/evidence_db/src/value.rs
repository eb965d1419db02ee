//! Engine values and rows, and their JSON rendering.

use base64::Engine as _;
use serde_json::{Map, Number, Value};

use crate::backend::BackendError;

/// Timestamp wrapper for database values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbTimestamp {
    inner: chrono::DateTime<chrono::Utc>,
}

impl DbTimestamp {
    /// Construct from Unix microseconds.
    pub fn from_unix_micros(micros: i64) -> Option<Self> {
        chrono::DateTime::from_timestamp_micros(micros).map(|inner| Self { inner })
    }

    /// RFC3339 string representation.
    pub fn to_rfc3339(&self) -> String {
        self.inner.to_rfc3339()
    }

    pub fn as_chrono(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.inner
    }
}

/// A single value read from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Integer(i64),
    Real(f64),
    /// Exact numeric rendered as text (decimals, 128-bit integers)
    Numeric(String),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
    Timestamp(DbTimestamp),
}

impl DbValue {
    /// JSON form returned to callers.
    pub fn to_json(&self) -> Value {
        match self {
            DbValue::Null => Value::Null,
            DbValue::Integer(v) => Value::Number((*v).into()),
            DbValue::Real(v) => Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(v.to_string())),
            DbValue::Numeric(v) | DbValue::Text(v) => Value::String(v.clone()),
            DbValue::Blob(v) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(v))
            }
            DbValue::Boolean(v) => Value::Bool(*v),
            DbValue::Timestamp(v) => Value::String(v.to_rfc3339()),
        }
    }
}

impl From<i64> for DbValue {
    fn from(v: i64) -> Self {
        DbValue::Integer(v)
    }
}

impl From<f64> for DbValue {
    fn from(v: f64) -> Self {
        DbValue::Real(v)
    }
}

impl From<&str> for DbValue {
    fn from(v: &str) -> Self {
        DbValue::Text(v.to_string())
    }
}

impl From<bool> for DbValue {
    fn from(v: bool) -> Self {
        DbValue::Boolean(v)
    }
}

/// Row data from a query result.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRow {
    values: Vec<DbValue>,
}

impl DbRow {
    pub fn new(values: Vec<DbValue>) -> Self {
        Self { values }
    }

    /// Get a value by column index.
    pub fn get<T: FromDbValue>(&self, index: usize) -> Result<T, BackendError> {
        self.values
            .get(index)
            .ok_or_else(|| {
                BackendError::TypeConversion(format!("Column index {} out of bounds", index))
            })
            .and_then(|v| T::from_db_value(v))
    }

    /// Get the raw DbValue at an index.
    pub fn get_raw(&self, index: usize) -> Option<&DbValue> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[DbValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Positional JSON array.
    pub fn to_json_array(&self) -> Vec<Value> {
        self.values.iter().map(DbValue::to_json).collect()
    }

    /// Name-keyed JSON object in column order.
    pub fn to_json_record(&self, columns: &[String]) -> Map<String, Value> {
        columns
            .iter()
            .cloned()
            .zip(self.values.iter().map(DbValue::to_json))
            .collect()
    }
}

/// Trait for converting from DbValue.
pub trait FromDbValue: Sized {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError>;
}

impl FromDbValue for i64 {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Integer(v) => Ok(*v),
            DbValue::Null => Err(BackendError::TypeConversion(
                "i64 field is NULL - use Option<i64> for nullable columns".to_string(),
            )),
            _ => Err(BackendError::TypeConversion("Expected integer".to_string())),
        }
    }
}

impl FromDbValue for f64 {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Real(v) => Ok(*v),
            DbValue::Integer(v) => Ok(*v as f64),
            DbValue::Null => Err(BackendError::TypeConversion(
                "f64 field is NULL - use Option<f64> for nullable columns".to_string(),
            )),
            _ => Err(BackendError::TypeConversion("Expected real".to_string())),
        }
    }
}

impl FromDbValue for String {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Text(v) | DbValue::Numeric(v) => Ok(v.clone()),
            DbValue::Null => Err(BackendError::TypeConversion(
                "String field is NULL - use Option<String> for nullable columns".to_string(),
            )),
            _ => Err(BackendError::TypeConversion("Expected text".to_string())),
        }
    }
}

impl FromDbValue for bool {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Boolean(v) => Ok(*v),
            DbValue::Integer(v) => Ok(*v != 0),
            DbValue::Null => Err(BackendError::TypeConversion(
                "bool field is NULL - use Option<bool> for nullable columns".to_string(),
            )),
            _ => Err(BackendError::TypeConversion("Expected boolean".to_string())),
        }
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Null => Ok(None),
            _ => T::from_db_value(value).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_rendering() {
        assert_eq!(DbValue::Integer(7).to_json(), json!(7));
        assert_eq!(DbValue::Real(1.5).to_json(), json!(1.5));
        assert_eq!(DbValue::Real(f64::NAN).to_json(), json!("NaN"));
        assert_eq!(DbValue::Numeric("12.30".into()).to_json(), json!("12.30"));
        assert_eq!(DbValue::Blob(vec![0, 1, 2]).to_json(), json!("AAEC"));
        assert_eq!(DbValue::Null.to_json(), Value::Null);

        let ts = DbTimestamp::from_unix_micros(0).unwrap();
        assert_eq!(
            DbValue::Timestamp(ts).to_json(),
            json!("1970-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn record_keeps_column_order() {
        let row = DbRow::new(vec![DbValue::from("b"), DbValue::from(1_i64)]);
        let columns = vec!["zeta".to_string(), "alpha".to_string()];
        let record = row.to_json_record(&columns);
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, columns);
    }

    #[test]
    fn typed_getters() {
        let row = DbRow::new(vec![DbValue::Integer(3), DbValue::Null]);
        assert_eq!(row.get::<i64>(0).unwrap(), 3);
        assert_eq!(row.get::<Option<String>>(1).unwrap(), None);
        assert!(row.get::<String>(1).is_err());
        assert!(row.get::<i64>(5).is_err());
    }
}
