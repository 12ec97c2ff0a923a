//! # Tradebook Core Library
//!
//! Sample-data generation and paged reads for a denormalized trades model
//! on a wide-column store.
//!
//! ## Modules
//! - `store`: The `Session` seam, structured statements and the embedded store.
//! - `catalog`: Table definitions and schema bootstrap.
//! - `generator`: Synthetic users, accounts and trades.
//! - `fanout`: Writes one trade to every projection and bumps its position.
//! - `pager`: Cursor-based paging and offset seeks.
//! - `queries`: Read statements, including trade filters.
//! - `seeder`, `inventory`: The "generate" and "count" operations.
//! - `config`: Layered application configuration.
//! - `fs`: Snapshot persistence.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fanout;
pub mod fs;
pub mod generator;
pub mod inventory;
pub mod pager;
pub mod queries;
pub mod records;
pub mod seeder;
pub mod store;

pub use error::{RangeError, Result, TradebookError, WriteError};
