//! Brokerage accounts, grouped by the user that owns them.

use serde::{Deserialize, Serialize};

/// A cash account owned by a user.
///
/// Accounts are looked up by owner, so the natural primary key is
/// `(username, account_number)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier (UUID text).
    account_number: String,
    /// Username of the owner.
    username: String,
    /// Cash held in the account.
    cash_balance: f64,
    /// Display label.
    name: String,
}

impl Account {
    /// Creates a new Account.
    ///
    /// # Arguments
    ///
    /// * `account_number` - Unique identifier of the account.
    /// * `username` - Owner of the account.
    /// * `cash_balance` - Cash held in the account.
    /// * `name` - Display label.
    ///
    /// # Returns
    ///
    /// A new `Account` instance.
    pub fn new(
        account_number: impl Into<String>,
        username: impl Into<String>,
        cash_balance: f64,
        name: impl Into<String>,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            username: username.into(),
            cash_balance,
            name: name.into(),
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn cash_balance(&self) -> f64 {
        self.cash_balance
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
