//! Running per-instrument counters kept for each account.

use serde::{Deserialize, Serialize};

/// Quantity assigned to a position the first time a trade touches it.
pub const DEFAULT_QUANTITY: i64 = 1;

/// Number of trades seen for an `(account, symbol)` pair.
///
/// The counter moves by one per trade regardless of side or size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    account: String,
    symbol: String,
    quantity: i64,
}

impl Position {
    pub fn new(account: impl Into<String>, symbol: impl Into<String>, quantity: i64) -> Self {
        Self {
            account: account.into(),
            symbol: symbol.into(),
            quantity,
        }
    }

    /// Creates the position for the first trade on a pair.
    pub fn opened(account: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::new(account, symbol, DEFAULT_QUANTITY)
    }

    /// Returns a copy with the quantity bumped by one.
    pub fn incremented(&self) -> Self {
        Self {
            account: self.account.clone(),
            symbol: self.symbol.clone(),
            quantity: self.quantity + 1,
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }
}
