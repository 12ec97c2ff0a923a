//! Cell values and rows as exchanged with a `Session`.

use super::error::StoreError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    BigInt,
    Double,
    /// Microseconds since the Unix epoch.
    Timestamp,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::BigInt => "bigint",
            ColumnType::Double => "double",
            ColumnType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A single typed cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Text(String),
    BigInt(i64),
    Double(f64),
    Timestamp(i64),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored in a column of type `ty`.
    /// `Null` fits every column.
    pub fn fits(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (Value::Null, _)
                | (Value::Text(_), ColumnType::Text)
                | (Value::BigInt(_), ColumnType::BigInt)
                | (Value::Double(_), ColumnType::Double)
                | (Value::Timestamp(_), ColumnType::Timestamp)
        )
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Text(_) => 1,
            Value::BigInt(_) => 2,
            Value::Double(_) => 3,
            Value::Timestamp(_) => 4,
        }
    }
}

// Doubles compare with `total_cmp` so rows and keys have a total order.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(s) => write!(f, "{}", s),
            Value::BigInt(n) => write!(f, "{}", n),
            Value::Double(d) => write!(f, "{}", d),
            Value::Timestamp(micros) => match chrono::DateTime::from_timestamp_micros(*micros) {
                Some(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S%.6f")),
                None => write!(f, "{}", micros),
            },
        }
    }
}

/// A row of named cells, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a cell, replacing any previous value of the column.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Value)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn text(&self, column: &str) -> Result<&str, StoreError> {
        match self.get(column) {
            Some(Value::Text(s)) => Ok(s),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn big_int(&self, column: &str) -> Result<i64, StoreError> {
        match self.get(column) {
            Some(Value::BigInt(n)) => Ok(*n),
            other => Err(mismatch(column, "bigint", other)),
        }
    }

    pub fn double(&self, column: &str) -> Result<f64, StoreError> {
        match self.get(column) {
            Some(Value::Double(d)) => Ok(*d),
            other => Err(mismatch(column, "double", other)),
        }
    }

    pub fn timestamp(&self, column: &str) -> Result<i64, StoreError> {
        match self.get(column) {
            Some(Value::Timestamp(t)) => Ok(*t),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }
}

fn mismatch(column: &str, expected: &str, got: Option<&Value>) -> StoreError {
    let got = match got {
        None => "missing".to_string(),
        Some(v) => format!("{:?}", v),
    };
    StoreError::InvalidQuery(format!(
        "column '{}' expected {}, got {}",
        column, expected, got
    ))
}
