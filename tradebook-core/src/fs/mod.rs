pub mod persistence;

pub use persistence::{load_snapshot, save_snapshot};
