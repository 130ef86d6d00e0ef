pub mod contract;
pub mod memory;

pub use contract::{
    Cursor, DocumentObserver, DocumentStore, ScanPage, Subscription, WriteBatch, WriteOp,
};
pub use memory::MemoryStore;

use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failures surfaced by a store adapter. Adapter-level failures are treated
/// like validation failures by the executors: logged, operation aborted, no
/// partial state retained.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    #[error("batch commit failed: {0}")]
    CommitFailed(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            key: key.into(),
        }
    }
}
