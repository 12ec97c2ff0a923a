//! Trade events.
//!
//! A `Trade` is immutable once generated: `amount` is fixed at construction
//! as `shares * price` and never recomputed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub const ALL: [TradeType; 2] = [TradeType::Buy, TradeType::Sell];

    /// Wire representation stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown trade type '{0}', expected BUY or SELL")]
pub struct ParseTradeTypeError(pub String);

impl FromStr for TradeType {
    type Err = ParseTradeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TradeType::Buy),
            "SELL" => Ok(TradeType::Sell),
            _ => Err(ParseTradeTypeError(s.to_string())),
        }
    }
}

/// Time-ordered trade identifier: microseconds since the Unix epoch.
///
/// Trade tables cluster on this id in descending order, so the newest trade
/// of an account comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(i64);

impl TradeId {
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_micros())
    }

    pub fn as_micros(&self) -> i64 {
        self.0
    }

    /// Returns `None` when the id lies outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S%.6f")),
            None => write!(f, "{}", self.0),
        }
    }
}

/// A single executed trade on an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    account: String,
    trade_id: TradeId,
    trade_type: TradeType,
    symbol: String,
    shares: i64,
    price: f64,
    amount: f64,
}

impl Trade {
    /// Creates a new Trade, deriving `amount` from shares and price.
    ///
    /// # Arguments
    ///
    /// * `account` - Account the trade was booked on.
    /// * `trade_id` - Time-ordered identifier.
    /// * `trade_type` - BUY or SELL.
    /// * `symbol` - Instrument ticker.
    /// * `shares` - Number of shares traded.
    /// * `price` - Unit price.
    ///
    /// # Returns
    ///
    /// A new `Trade` with `amount == shares * price`.
    pub fn new(
        account: impl Into<String>,
        trade_id: TradeId,
        trade_type: TradeType,
        symbol: impl Into<String>,
        shares: i64,
        price: f64,
    ) -> Self {
        Self {
            account: account.into(),
            trade_id,
            trade_type,
            symbol: symbol.into(),
            shares,
            price,
            amount: shares as f64 * price,
        }
    }

    /// Rebuilds a trade read back from storage, keeping the stored amount.
    pub fn restore(
        account: impl Into<String>,
        trade_id: TradeId,
        trade_type: TradeType,
        symbol: impl Into<String>,
        shares: i64,
        price: f64,
        amount: f64,
    ) -> Self {
        Self {
            account: account.into(),
            trade_id,
            trade_type,
            symbol: symbol.into(),
            shares,
            price,
            amount,
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn trade_id(&self) -> TradeId {
        self.trade_id
    }

    pub fn trade_type(&self) -> TradeType {
        self.trade_type
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn shares(&self) -> i64 {
        self.shares
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}
