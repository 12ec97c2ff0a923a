//! Structured statements with typed bound values.
//!
//! Values never get spliced into statement text. `Display` renders CQL with
//! `?` bind markers, which is what gets logged; the values travel separately
//! and are only compared, never parsed.

use super::value::{Row, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    pub fn matches(&self, cell: &Value, bound: &Value) -> bool {
        if cell.is_null() {
            return false;
        }
        match self {
            Relation::Eq => cell == bound,
            Relation::Lt => cell < bound,
            Relation::Le => cell <= bound,
            Relation::Gt => cell > bound,
            Relation::Ge => cell >= bound,
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }
}

/// One `column <op> ?` term of a WHERE clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    pub column: String,
    pub relation: Relation,
    pub value: Value,
}

impl Restriction {
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column)
            .map(|cell| self.relation.matches(cell, &self.value))
            .unwrap_or(false)
    }
}

/// A SELECT against a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    table: String,
    columns: Option<Vec<String>>,
    restrictions: Vec<Restriction>,
    allow_filtering: bool,
}

impl Select {
    /// Selects every column of `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            restrictions: Vec::new(),
            allow_filtering: false,
        }
    }

    /// Narrows the projection to the given columns.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn where_eq(self, column: &str, value: Value) -> Self {
        self.restrict(column, Relation::Eq, value)
    }

    pub fn restrict(mut self, column: &str, relation: Relation, value: Value) -> Self {
        self.restrictions.push(Restriction {
            column: column.to_string(),
            relation,
            value,
        });
        self
    }

    pub fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    pub fn is_filtering_allowed(&self) -> bool {
        self.allow_filtering
    }

    pub fn bound_values(&self) -> Vec<&Value> {
        self.restrictions.iter().map(|r| &r.value).collect()
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = match &self.columns {
            Some(columns) => columns.join(", "),
            None => "*".to_string(),
        };
        write!(f, "SELECT {} FROM {}", columns, self.table)?;
        for (i, r) in self.restrictions.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {} {} {} ?", keyword, r.column, r.relation.operator())?;
        }
        if self.allow_filtering {
            f.write_str(" ALLOW FILTERING")?;
        }
        Ok(())
    }
}

/// An upserting INSERT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    table: String,
    row: Row,
    if_not_exists: bool,
}

impl Insert {
    pub fn new(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            row,
            if_not_exists: false,
        }
    }

    /// Turns the insert into a lightweight transaction that only applies
    /// when no row with the same primary key exists.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn is_conditional(&self) -> bool {
        self.if_not_exists
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<&str> = self.row.columns().collect();
        let markers = vec!["?"; columns.len()];
        write!(
            f,
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            markers.join(", ")
        )?;
        if self.if_not_exists {
            f.write_str(" IF NOT EXISTS")?;
        }
        Ok(())
    }
}

/// `UPDATE table SET column = ? WHERE key.. IF column = ?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalUpdate {
    table: String,
    key: Row,
    column: String,
    new_value: Value,
    expected: Value,
}

impl ConditionalUpdate {
    pub fn new(
        table: impl Into<String>,
        key: Row,
        column: impl Into<String>,
        new_value: Value,
        expected: Value,
    ) -> Self {
        Self {
            table: table.into(),
            key,
            column: column.into(),
            new_value,
            expected,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key(&self) -> &Row {
        &self.key
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn new_value(&self) -> &Value {
        &self.new_value
    }

    pub fn expected(&self) -> &Value {
        &self.expected
    }
}

impl fmt::Display for ConditionalUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key: Vec<String> = self.key.columns().map(|c| format!("{} = ?", c)).collect();
        write!(
            f,
            "UPDATE {} SET {} = ? WHERE {} IF {} = ?",
            self.table,
            self.column,
            key.join(" AND "),
            self.column
        )
    }
}
