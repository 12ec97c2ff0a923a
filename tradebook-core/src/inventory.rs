use crate::catalog::table_names;
use crate::error::Result;
use crate::store::Session;
use log::debug;

/// Row count of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: u64,
}

/// Counts the rows of every table of the data model.
pub fn inventory<S: Session>(session: &S) -> Result<Vec<TableCount>> {
    let mut counts = Vec::new();
    for table in table_names() {
        let rows = session.count(table)?;
        debug!("{}: {} rows", table, rows);
        counts.push(TableCount { table, rows });
    }
    Ok(counts)
}
