//! Conversions between domain records and store rows.

use crate::store::{Row, StoreError, StoreResult, Value};
use tradebook::{Account, Position, Trade, TradeId, TradeType};

pub fn trade_to_row(trade: &Trade) -> Row {
    Row::new()
        .with("account", Value::text(trade.account()))
        .with("trade_id", Value::Timestamp(trade.trade_id().as_micros()))
        .with("type", Value::text(trade.trade_type().as_str()))
        .with("symbol", Value::text(trade.symbol()))
        .with("shares", Value::BigInt(trade.shares()))
        .with("price", Value::Double(trade.price()))
        .with("amount", Value::Double(trade.amount()))
}

pub fn trade_from_row(row: &Row) -> StoreResult<Trade> {
    let trade_type = row
        .text("type")?
        .parse::<TradeType>()
        .map_err(|e| StoreError::InvalidQuery(e.to_string()))?;
    Ok(Trade::restore(
        row.text("account")?,
        TradeId::from_micros(row.timestamp("trade_id")?),
        trade_type,
        row.text("symbol")?,
        row.big_int("shares")?,
        row.double("price")?,
        row.double("amount")?,
    ))
}

pub fn account_to_row(account: &Account) -> Row {
    Row::new()
        .with("username", Value::text(account.username()))
        .with("account_number", Value::text(account.account_number()))
        .with("cash_balance", Value::Double(account.cash_balance()))
        .with("name", Value::text(account.name()))
}

pub fn account_from_row(row: &Row) -> StoreResult<Account> {
    Ok(Account::new(
        row.text("account_number")?,
        row.text("username")?,
        row.double("cash_balance")?,
        row.text("name")?,
    ))
}

/// Primary key cells of a position.
pub fn position_key(account: &str, symbol: &str) -> Row {
    Row::new()
        .with("account", Value::text(account))
        .with("symbol", Value::text(symbol))
}

pub fn position_to_row(position: &Position) -> Row {
    position_key(position.account(), position.symbol())
        .with("quantity", Value::BigInt(position.quantity()))
}

pub fn position_from_row(row: &Row) -> StoreResult<Position> {
    Ok(Position::new(
        row.text("account")?,
        row.text("symbol")?,
        row.big_int("quantity")?,
    ))
}
