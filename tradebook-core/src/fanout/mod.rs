//! Denormalized writes.
//!
//! One trade becomes four rows, one per [`TradeProjection`], followed by an
//! upsert of the `(account, symbol)` position counter. The writes are
//! independent: the first failure stops the call and nothing already
//! written is undone, so a failed `record_trade` can leave the projections
//! disagreeing with each other.

pub mod projection;

use crate::catalog::{ACCOUNTS_BY_USER, POSITIONS_BY_ACCOUNT};
use crate::config::PositionUpdateMode;
use crate::error::WriteError;
use crate::records::{account_to_row, position_from_row, position_key, position_to_row, trade_to_row};
use crate::store::{ConditionalUpdate, Insert, Select, Session, StoreError, Value};
use log::{debug, warn};
use tradebook::{Account, Position, Trade};

pub use projection::TradeProjection;

/// Outcome of reading a position before bumping it.
enum LookupError {
    NotFound,
    Store(StoreError),
}

/// Writes accounts and trades through a session.
pub struct TradeWriter<S: Session> {
    session: S,
    mode: PositionUpdateMode,
}

impl<S: Session> TradeWriter<S> {
    pub fn new(session: S, mode: PositionUpdateMode) -> Self {
        Self { session, mode }
    }

    pub fn mode(&self) -> PositionUpdateMode {
        self.mode
    }

    /// Stores an account under its owner.
    pub fn record_account(&self, account: &Account) -> Result<(), WriteError> {
        self.write(&Insert::new(ACCOUNTS_BY_USER, account_to_row(account)))
            .map(|_| ())
    }

    /// Writes `trade` to every projection, then counts it in the position
    /// of its `(account, symbol)` pair.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once all five writes went through.
    /// * `Err(WriteError)` for the first write that failed. Rows written
    ///   before it are kept.
    pub fn record_trade(&self, trade: &Trade) -> Result<(), WriteError> {
        let row = trade_to_row(trade);
        for projection in TradeProjection::ALL {
            self.write(&Insert::new(projection.table(), row.clone()))?;
        }
        self.bump_position(trade.account(), trade.symbol())?;
        debug!(
            "Recorded trade {} {} {} x{} on {}",
            trade.trade_id(),
            trade.trade_type(),
            trade.symbol(),
            trade.shares(),
            trade.account()
        );
        Ok(())
    }

    fn bump_position(&self, account: &str, symbol: &str) -> Result<(), WriteError> {
        let current = match self.find_position(account, symbol) {
            Ok(position) => Some(position),
            Err(LookupError::NotFound) => None,
            Err(LookupError::Store(source)) => {
                warn!("Position lookup for {}/{} failed: {}", account, symbol, source);
                return Err(WriteError::Lookup {
                    table: POSITIONS_BY_ACCOUNT.to_string(),
                    source,
                });
            }
        };

        let applied = match (self.mode, current) {
            (PositionUpdateMode::ReadModifyWrite, Some(position)) => {
                self.write(&Insert::new(POSITIONS_BY_ACCOUNT, position_to_row(&position.incremented())))?
            }
            (PositionUpdateMode::ReadModifyWrite, None) => self.write(&Insert::new(
                POSITIONS_BY_ACCOUNT,
                position_to_row(&Position::opened(account, symbol)),
            ))?,
            (PositionUpdateMode::CompareAndSet, Some(position)) => {
                self.write_conditional(&ConditionalUpdate::new(
                    POSITIONS_BY_ACCOUNT,
                    position_key(account, symbol),
                    "quantity",
                    Value::BigInt(position.incremented().quantity()),
                    Value::BigInt(position.quantity()),
                ))?
            }
            (PositionUpdateMode::CompareAndSet, None) => self.write(
                &Insert::new(
                    POSITIONS_BY_ACCOUNT,
                    position_to_row(&Position::opened(account, symbol)),
                )
                .if_not_exists(),
            )?,
        };

        if !applied {
            warn!("Lost the race updating position {}/{}", account, symbol);
            return Err(WriteError::Conflict {
                account: account.to_string(),
                symbol: symbol.to_string(),
            });
        }
        Ok(())
    }

    fn find_position(&self, account: &str, symbol: &str) -> Result<Position, LookupError> {
        let select = Select::new(POSITIONS_BY_ACCOUNT)
            .where_eq("account", Value::text(account))
            .where_eq("symbol", Value::text(symbol));
        let page = self
            .session
            .select_page(&select, 1, None)
            .map_err(LookupError::Store)?;
        match page.rows.first() {
            Some(row) => position_from_row(row).map_err(LookupError::Store),
            None => Err(LookupError::NotFound),
        }
    }

    fn write(&self, insert: &Insert) -> Result<bool, WriteError> {
        self.session.insert(insert).map_err(|source| {
            warn!("{} failed: {}", insert, source);
            WriteError::Store {
                table: insert.table().to_string(),
                source,
            }
        })
    }

    fn write_conditional(&self, update: &ConditionalUpdate) -> Result<bool, WriteError> {
        self.session.update_if(update).map_err(|source| {
            warn!("{} failed: {}", update, source);
            WriteError::Store {
                table: update.table().to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::bootstrap;
    use crate::records::trade_from_row;
    use crate::store::testing::FaultySession;
    use crate::store::MemorySession;
    use tradebook::{TradeId, TradeType};

    fn session() -> MemorySession {
        let session = MemorySession::new("tradebook");
        bootstrap(&session, 1).unwrap();
        session
    }

    fn trade(id: i64, symbol: &str) -> Trade {
        Trade::new("acc-1", TradeId::from_micros(id), TradeType::Buy, symbol, 7, 12.5)
    }

    fn quantity<S: Session>(session: &S, symbol: &str) -> Option<i64> {
        let select = Select::new(POSITIONS_BY_ACCOUNT)
            .where_eq("account", Value::text("acc-1"))
            .where_eq("symbol", Value::text(symbol));
        let page = session.select_page(&select, 1, None).unwrap();
        page.rows.first().map(|r| r.big_int("quantity").unwrap())
    }

    #[test]
    fn test_trade_lands_in_every_projection() {
        let session = session();
        let writer = TradeWriter::new(&session, PositionUpdateMode::ReadModifyWrite);
        let t = trade(100, "AAPL");
        writer.record_trade(&t).unwrap();

        for projection in TradeProjection::ALL {
            let page = session
                .select_page(&Select::new(projection.table()), 10, None)
                .unwrap();
            assert_eq!(page.rows.len(), 1, "{}", projection);
            assert_eq!(trade_from_row(&page.rows[0]).unwrap(), t);
        }
        assert_eq!(quantity(&session, "AAPL"), Some(1));
    }

    #[test]
    fn test_position_counts_trades_in_both_modes() {
        for mode in [PositionUpdateMode::ReadModifyWrite, PositionUpdateMode::CompareAndSet] {
            let session = session();
            let writer = TradeWriter::new(&session, mode);
            for i in 0..4 {
                writer.record_trade(&trade(i, "MSFT")).unwrap();
            }
            writer.record_trade(&trade(10, "IBM")).unwrap();
            assert_eq!(quantity(&session, "MSFT"), Some(4));
            assert_eq!(quantity(&session, "IBM"), Some(1));
        }
    }

    #[test]
    fn test_failed_projection_stops_the_fan_out() {
        let faulty = FaultySession::new(session());
        faulty.fail_writes_to("trades_by_a_std");
        let writer = TradeWriter::new(&faulty, PositionUpdateMode::ReadModifyWrite);

        let err = writer.record_trade(&trade(1, "AAPL")).unwrap_err();
        assert_eq!(err.table(), "trades_by_a_std");
        assert_eq!(faulty.count("trades_by_a_d").unwrap(), 1);
        assert_eq!(faulty.count("trades_by_a_sd").unwrap(), 1);
        assert_eq!(faulty.count("trades_by_a_std").unwrap(), 0);
        assert_eq!(faulty.count("trades_by_a_td").unwrap(), 0);
        assert_eq!(faulty.count(POSITIONS_BY_ACCOUNT).unwrap(), 0);
    }

    #[test]
    fn test_lookup_failure_is_not_treated_as_missing() {
        let faulty = FaultySession::new(session());
        faulty.fail_reads(true);
        let writer = TradeWriter::new(&faulty, PositionUpdateMode::ReadModifyWrite);

        let err = writer.record_trade(&trade(1, "AAPL")).unwrap_err();
        assert!(matches!(err, WriteError::Lookup { .. }));
        assert_eq!(faulty.inner().count(POSITIONS_BY_ACCOUNT).unwrap(), 0);
    }

    #[test]
    fn test_compare_and_set_reports_conflicts() {
        let faulty = FaultySession::new(session());
        let writer = TradeWriter::new(&faulty, PositionUpdateMode::CompareAndSet);
        writer.record_trade(&trade(1, "AAPL")).unwrap();

        faulty.lose_next_update();
        let err = writer.record_trade(&trade(2, "AAPL")).unwrap_err();
        assert_eq!(
            err,
            WriteError::Conflict {
                account: "acc-1".to_string(),
                symbol: "AAPL".to_string(),
            }
        );
        assert_eq!(quantity(&faulty, "AAPL"), Some(1));
    }

    #[test]
    fn test_record_account() {
        let session = session();
        let writer = TradeWriter::new(&session, PositionUpdateMode::default());
        writer
            .record_account(&Account::new("n-1", "alice", 10.0, "ORG-A1-RIPE"))
            .unwrap();
        assert_eq!(session.count(ACCOUNTS_BY_USER).unwrap(), 1);
    }
}
