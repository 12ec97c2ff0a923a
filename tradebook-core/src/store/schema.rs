//! Keyspace and table definitions.
//!
//! A table's primary key is its partition key columns followed by its
//! clustering columns. Rows of a partition are kept sorted by the clustering
//! columns, each in its own direction.

use super::error::{StoreError, StoreResult};
use super::value::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceSchema {
    name: String,
    replication_factor: u32,
}

impl KeyspaceSchema {
    pub fn new(name: impl Into<String>, replication_factor: u32) -> Self {
        Self {
            name: name.into(),
            replication_factor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn replication_factor(&self) -> u32 {
        self.replication_factor
    }
}

impl fmt::Display for KeyspaceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{ 'class': 'SimpleStrategy', 'replication_factor': {} }}",
            self.name, self.replication_factor
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusteringOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// Definition of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
    partition_key: Vec<String>,
    clustering: Vec<(String, ClusteringOrder)>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            partition_key: Vec::new(),
            clustering: Vec::new(),
        }
    }

    pub fn partition_key(mut self, name: &str, column_type: ColumnType) -> Self {
        self.push_column(name, column_type);
        self.partition_key.push(name.to_string());
        self
    }

    pub fn clustering(mut self, name: &str, column_type: ColumnType, order: ClusteringOrder) -> Self {
        self.push_column(name, column_type);
        self.clustering.push((name.to_string(), order));
        self
    }

    pub fn column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.push_column(name, column_type);
        self
    }

    fn push_column(&mut self, name: &str, column_type: ColumnType) {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            column_type,
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn partition_key_columns(&self) -> &[String] {
        &self.partition_key
    }

    pub fn clustering_columns(&self) -> &[(String, ClusteringOrder)] {
        &self.clustering
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }

    pub fn is_partition_key(&self, name: &str) -> bool {
        self.partition_key.iter().any(|c| c == name)
    }

    /// Position of `name` among the clustering columns.
    pub fn clustering_index(&self, name: &str) -> Option<usize> {
        self.clustering.iter().position(|(c, _)| c == name)
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.is_partition_key(name) || self.clustering_index(name).is_some()
    }

    /// Checks the definition is usable: a partition key, no duplicate columns.
    pub fn validate(&self) -> StoreResult<()> {
        if self.partition_key.is_empty() {
            return Err(StoreError::InvalidQuery(format!(
                "table '{}' has no partition key",
                self.name
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(StoreError::InvalidQuery(format!(
                    "table '{}' declares column '{}' twice",
                    self.name, column.name
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE IF NOT EXISTS {} (", self.name)?;
        for column in &self.columns {
            write!(f, "{} {}, ", column.name, column.column_type)?;
        }
        let clustering: Vec<&str> = self.clustering.iter().map(|(c, _)| c.as_str()).collect();
        write!(f, "PRIMARY KEY (({})", self.partition_key.join(", "))?;
        if !clustering.is_empty() {
            write!(f, ", {}", clustering.join(", "))?;
        }
        f.write_str("))")?;
        if !self.clustering.is_empty() {
            let order: Vec<String> = self
                .clustering
                .iter()
                .map(|(c, o)| match o {
                    ClusteringOrder::Asc => format!("{} ASC", c),
                    ClusteringOrder::Desc => format!("{} DESC", c),
                })
                .collect();
            write!(f, " WITH CLUSTERING ORDER BY ({})", order.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions() -> TableSchema {
        TableSchema::new("positions_by_account")
            .partition_key("account", ColumnType::Text)
            .clustering("symbol", ColumnType::Text, ClusteringOrder::Desc)
            .column("quantity", ColumnType::BigInt)
    }

    #[test]
    fn test_key_roles() {
        let schema = positions();
        assert!(schema.is_partition_key("account"));
        assert_eq!(schema.clustering_index("symbol"), Some(0));
        assert!(!schema.is_primary_key("quantity"));
        assert_eq!(schema.column_type("quantity"), Some(ColumnType::BigInt));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_ddl_rendering() {
        let ddl = positions().to_string();
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS positions_by_account (account text, symbol text, quantity bigint, \
             PRIMARY KEY ((account), symbol)) WITH CLUSTERING ORDER BY (symbol DESC)"
        );
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let schema = positions().column("quantity", ColumnType::Double);
        assert!(schema.validate().is_err());
    }
}
