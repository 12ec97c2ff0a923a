//! Store access: the `Session` seam, statements, and the embedded backend.

pub mod error;
pub mod memory;
pub mod schema;
pub mod session;
pub mod statement;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod value;

pub use error::{StoreError, StoreResult};
pub use memory::MemorySession;
pub use schema::{ClusteringOrder, ColumnDef, KeyspaceSchema, TableSchema};
pub use session::{PagingState, ResultPage, Session};
pub use statement::{ConditionalUpdate, Insert, Relation, Restriction, Select};
pub use value::{ColumnType, Row, Value};
