//! Table definitions and schema bootstrap.

use crate::fanout::projection::TradeProjection;
use crate::store::{ClusteringOrder, ColumnType, KeyspaceSchema, Session, StoreResult, TableSchema};
use log::info;

pub const ACCOUNTS_BY_USER: &str = "accounts_by_user";
pub const POSITIONS_BY_ACCOUNT: &str = "positions_by_account";

pub fn accounts_by_user() -> TableSchema {
    TableSchema::new(ACCOUNTS_BY_USER)
        .partition_key("username", ColumnType::Text)
        .clustering("account_number", ColumnType::Text, ClusteringOrder::Desc)
        .column("cash_balance", ColumnType::Double)
        .column("name", ColumnType::Text)
}

pub fn positions_by_account() -> TableSchema {
    TableSchema::new(POSITIONS_BY_ACCOUNT)
        .partition_key("account", ColumnType::Text)
        .clustering("symbol", ColumnType::Text, ClusteringOrder::Desc)
        .column("quantity", ColumnType::BigInt)
}

/// Every table of the data model, accounts and positions first.
pub fn tables() -> Vec<TableSchema> {
    let mut tables = vec![accounts_by_user(), positions_by_account()];
    tables.extend(TradeProjection::ALL.iter().map(|p| p.schema()));
    tables
}

pub fn table_names() -> Vec<&'static str> {
    let mut names = vec![ACCOUNTS_BY_USER, POSITIONS_BY_ACCOUNT];
    names.extend(TradeProjection::ALL.iter().map(|p| p.table()));
    names
}

/// Creates the session keyspace and every table that does not exist yet.
pub fn bootstrap<S: Session>(session: &S, replication_factor: u32) -> StoreResult<()> {
    session.create_keyspace(&KeyspaceSchema::new(session.keyspace(), replication_factor))?;
    for table in tables() {
        session.create_table(&table)?;
    }
    info!(
        "Schema ready in keyspace {} ({} tables)",
        session.keyspace(),
        table_names().len()
    );
    Ok(())
}
