//! The trade projections: one table per access pattern.
//!
//! Every projection is partitioned by account and clustered newest trade
//! first, with the filter columns of its access pattern in front of
//! `trade_id` so equality on them and a range on `trade_id` can be served
//! without filtering.

use crate::store::{ClusteringOrder, ColumnType, TableSchema};
use std::fmt;

pub const TRADES_BY_A_D: &str = "trades_by_a_d";
pub const TRADES_BY_A_SD: &str = "trades_by_a_sd";
pub const TRADES_BY_A_STD: &str = "trades_by_a_std";
pub const TRADES_BY_A_TD: &str = "trades_by_a_td";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeProjection {
    /// (account, date)
    ByDate,
    /// (account, symbol, date)
    BySymbolDate,
    /// (account, symbol, type, date)
    BySymbolTypeDate,
    /// (account, type, date)
    ByTypeDate,
}

impl TradeProjection {
    /// Write order of a fan-out.
    pub const ALL: [TradeProjection; 4] = [
        TradeProjection::ByDate,
        TradeProjection::BySymbolDate,
        TradeProjection::BySymbolTypeDate,
        TradeProjection::ByTypeDate,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            TradeProjection::ByDate => TRADES_BY_A_D,
            TradeProjection::BySymbolDate => TRADES_BY_A_SD,
            TradeProjection::BySymbolTypeDate => TRADES_BY_A_STD,
            TradeProjection::ByTypeDate => TRADES_BY_A_TD,
        }
    }

    /// Clustering columns in front of `trade_id`.
    fn filter_columns(&self) -> &'static [&'static str] {
        match self {
            TradeProjection::ByDate => &[],
            TradeProjection::BySymbolDate => &["symbol"],
            TradeProjection::BySymbolTypeDate => &["symbol", "type"],
            TradeProjection::ByTypeDate => &["type"],
        }
    }

    /// The projection able to answer a query pinning the given columns
    /// within one account.
    pub fn serving(symbol: bool, trade_type: bool) -> Self {
        match (symbol, trade_type) {
            (false, false) => TradeProjection::ByDate,
            (true, false) => TradeProjection::BySymbolDate,
            (true, true) => TradeProjection::BySymbolTypeDate,
            (false, true) => TradeProjection::ByTypeDate,
        }
    }

    pub fn schema(&self) -> TableSchema {
        let mut schema = TableSchema::new(self.table()).partition_key("account", ColumnType::Text);
        for column in self.filter_columns() {
            schema = schema.clustering(column, ColumnType::Text, ClusteringOrder::Asc);
        }
        schema = schema.clustering("trade_id", ColumnType::Timestamp, ClusteringOrder::Desc);
        for column in ["type", "symbol"] {
            if !self.filter_columns().contains(&column) {
                schema = schema.column(column, ColumnType::Text);
            }
        }
        schema
            .column("shares", ColumnType::BigInt)
            .column("price", ColumnType::Double)
            .column("amount", ColumnType::Double)
    }
}

impl fmt::Display for TradeProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}
