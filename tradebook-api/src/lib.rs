//! # Tradebook API
//!
//! Domain types shared by the generator, the write fan-out and the query
//! walker, plus the `FakeDataProvider` seam used to randomize them.

pub mod model;
pub mod traits;

pub use model::account::Account;
pub use model::position::{DEFAULT_QUANTITY, Position};
pub use model::trade::{ParseTradeTypeError, Trade, TradeId, TradeType};
pub use model::user::User;
pub use traits::fake_data::FakeDataProvider;
