//! Read statements of the data model.
//!
//! Every query pins a partition, except the two used to pick a random
//! user or account, which scan a whole table through its partition key
//! column only.

use crate::catalog::{ACCOUNTS_BY_USER, POSITIONS_BY_ACCOUNT};
use crate::fanout::TradeProjection;
use crate::store::{Relation, Select, Value};
use std::fmt;
use tradebook::{TradeId, TradeType};

pub fn accounts_for_user(username: &str) -> Select {
    Select::new(ACCOUNTS_BY_USER).where_eq("username", Value::text(username))
}

pub fn positions_for_account(account: &str) -> Select {
    Select::new(POSITIONS_BY_ACCOUNT).where_eq("account", Value::text(account))
}

/// One row per account, so a user appears once per account they own.
pub fn usernames() -> Select {
    Select::new(ACCOUNTS_BY_USER).columns(&["username"])
}

/// One row per position.
pub fn position_accounts() -> Select {
    Select::new(POSITIONS_BY_ACCOUNT).columns(&["account"])
}

pub fn symbols_for_account(account: &str) -> Select {
    positions_for_account(account).columns(&["symbol"])
}

/// The trade searches offered by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeQueryKind {
    All,
    DateRange,
    DateRangeType,
    DateRangeTypeSymbol,
    DateRangeSymbol,
}

impl TradeQueryKind {
    pub const ALL: [TradeQueryKind; 5] = [
        TradeQueryKind::All,
        TradeQueryKind::DateRange,
        TradeQueryKind::DateRangeType,
        TradeQueryKind::DateRangeTypeSymbol,
        TradeQueryKind::DateRangeSymbol,
    ];

    pub fn uses_range(&self) -> bool {
        !matches!(self, TradeQueryKind::All)
    }

    pub fn uses_type(&self) -> bool {
        matches!(
            self,
            TradeQueryKind::DateRangeType | TradeQueryKind::DateRangeTypeSymbol
        )
    }

    pub fn uses_symbol(&self) -> bool {
        matches!(
            self,
            TradeQueryKind::DateRangeTypeSymbol | TradeQueryKind::DateRangeSymbol
        )
    }
}

impl fmt::Display for TradeQueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TradeQueryKind::All => "All trades by date",
            TradeQueryKind::DateRange => "Trades in a date range",
            TradeQueryKind::DateRangeType => "Trades in a date range by type",
            TradeQueryKind::DateRangeTypeSymbol => "Trades in a date range by type and symbol",
            TradeQueryKind::DateRangeSymbol => "Trades in a date range by symbol",
        };
        f.write_str(label)
    }
}

/// Trades of one account, optionally narrowed by `from <= trade_id < to`,
/// side and symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFilter {
    account: String,
    range: Option<(TradeId, TradeId)>,
    trade_type: Option<TradeType>,
    symbol: Option<String>,
}

impl TradeFilter {
    pub fn for_account(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            range: None,
            trade_type: None,
            symbol: None,
        }
    }

    pub fn between(mut self, from: TradeId, to: TradeId) -> Self {
        self.range = Some((from, to));
        self
    }

    pub fn of_type(mut self, trade_type: TradeType) -> Self {
        self.trade_type = Some(trade_type);
        self
    }

    pub fn on_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn kind(&self) -> TradeQueryKind {
        match (self.range.is_some(), self.trade_type.is_some(), self.symbol.is_some()) {
            (_, true, true) => TradeQueryKind::DateRangeTypeSymbol,
            (_, true, false) => TradeQueryKind::DateRangeType,
            (_, false, true) => TradeQueryKind::DateRangeSymbol,
            (true, false, false) => TradeQueryKind::DateRange,
            (false, false, false) => TradeQueryKind::All,
        }
    }

    /// The projection keyed for this filter.
    pub fn projection(&self) -> TradeProjection {
        TradeProjection::serving(self.symbol.is_some(), self.trade_type.is_some())
    }

    /// Builds the statement. Equality terms come in clustering order, so
    /// the chosen projection serves it without filtering.
    pub fn to_select(&self) -> Select {
        let mut select =
            Select::new(self.projection().table()).where_eq("account", Value::text(&self.account));
        if let Some(symbol) = &self.symbol {
            select = select.where_eq("symbol", Value::text(symbol));
        }
        if let Some(trade_type) = self.trade_type {
            select = select.where_eq("type", Value::text(trade_type.as_str()));
        }
        if let Some((from, to)) = self.range {
            select = select
                .restrict("trade_id", Relation::Ge, Value::Timestamp(from.as_micros()))
                .restrict("trade_id", Relation::Lt, Value::Timestamp(to.as_micros()));
        }
        select
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_picks_projection() {
        let base = TradeFilter::for_account("a");
        let range = base
            .clone()
            .between(TradeId::from_micros(1), TradeId::from_micros(2));

        assert_eq!(base.kind(), TradeQueryKind::All);
        assert_eq!(base.projection(), TradeProjection::ByDate);
        assert_eq!(range.kind(), TradeQueryKind::DateRange);
        assert_eq!(range.projection(), TradeProjection::ByDate);

        let typed = range.clone().of_type(TradeType::Sell);
        assert_eq!(typed.kind(), TradeQueryKind::DateRangeType);
        assert_eq!(typed.projection(), TradeProjection::ByTypeDate);

        let both = typed.on_symbol("IBM");
        assert_eq!(both.kind(), TradeQueryKind::DateRangeTypeSymbol);
        assert_eq!(both.projection(), TradeProjection::BySymbolTypeDate);

        let symbol = range.on_symbol("IBM");
        assert_eq!(symbol.kind(), TradeQueryKind::DateRangeSymbol);
        assert_eq!(symbol.projection(), TradeProjection::BySymbolDate);
    }

    #[test]
    fn test_statement_text() {
        let select = TradeFilter::for_account("a")
            .between(TradeId::from_micros(1), TradeId::from_micros(2))
            .of_type(TradeType::Buy)
            .on_symbol("IBM")
            .to_select();
        assert_eq!(
            select.to_string(),
            "SELECT * FROM trades_by_a_std WHERE account = ? AND symbol = ? AND type = ? \
             AND trade_id >= ? AND trade_id < ?"
        );
        assert!(!select.is_filtering_allowed());
    }

    #[test]
    fn test_kind_flags() {
        assert!(!TradeQueryKind::All.uses_range());
        assert!(TradeQueryKind::DateRangeSymbol.uses_symbol());
        assert!(!TradeQueryKind::DateRangeSymbol.uses_type());
        assert_eq!(TradeQueryKind::ALL.len(), 5);
    }
}
