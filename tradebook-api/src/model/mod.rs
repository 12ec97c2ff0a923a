pub mod account;
pub mod position;
pub mod trade;
pub mod user;

pub use account::Account;
pub use position::{Position, DEFAULT_QUANTITY};
pub use trade::{ParseTradeTypeError, Trade, TradeId, TradeType};
pub use user::User;
