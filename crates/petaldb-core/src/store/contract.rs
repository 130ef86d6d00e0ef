use crate::{
    store::StoreError,
    types::{Record, Value},
};
use std::rc::Rc;

///
/// DocumentStore
///
/// The narrow persistence contract the executors consume. Implementations
/// are free to choose their own interior mutability; callers run under
/// single-threaded cooperative scheduling and block on each call.
///

pub trait DocumentStore {
    /// Point lookup by collection and key.
    fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError>;

    /// Full-document write (replace if present).
    fn put(&self, collection: &str, key: &str, record: Record) -> Result<(), StoreError>;

    /// Partial write: only the listed fields are touched.
    fn patch(&self, collection: &str, key: &str, fields: Record) -> Result<(), StoreError>;

    /// Remove a document. Removing an absent document is a no-op.
    fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Ordered, finite scan; restartable via the returned cursor.
    fn scan(
        &self,
        collection: &str,
        order_field: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<ScanPage, StoreError>;

    /// All documents whose `field` equals `value`.
    fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Record)>, StoreError>;

    /// All documents whose list-valued `field` contains `value`.
    fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Record)>, StoreError>;

    /// Apply a staged batch atomically: every op becomes visible together,
    /// or none do.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Subscribe to a single document. The observer is pushed the full
    /// document (or its absence) after every committed mutation touching it.
    fn subscribe(
        &self,
        collection: &str,
        key: &str,
        observer: Rc<dyn DocumentObserver>,
    ) -> Result<Subscription, StoreError>;
}

///
/// DocumentObserver
///
/// Receiver side of a document subscription. `None` means the document no
/// longer exists.
///

pub trait DocumentObserver {
    fn on_change(&self, snapshot: Option<&Record>);
}

///
/// Cursor
///
/// Scan continuation: the order-field value to start at (inclusive).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cursor(pub Value);

///
/// ScanPage
///
/// One block of an ordered scan, with the cursor for the next block when
/// more documents remain.
///

#[derive(Clone, Debug)]
pub struct ScanPage {
    pub records: Vec<(String, Record)>,
    pub next: Option<Cursor>,
}

///
/// WriteBatch
///
/// Staged multi-document mutation. Ops accumulate in order and commit
/// atomically through [`DocumentStore::commit`].
///

#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

#[derive(Clone, Debug)]
pub enum WriteOp {
    Put {
        collection: String,
        key: String,
        record: Record,
    },
    Patch {
        collection: String,
        key: String,
        fields: Record,
    },
    Delete {
        collection: String,
        key: String,
    },
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, collection: &str, key: &str, record: Record) {
        self.ops.push(WriteOp::Put {
            collection: collection.to_owned(),
            key: key.to_owned(),
            record,
        });
    }

    pub fn patch(&mut self, collection: &str, key: &str, fields: Record) {
        self.ops.push(WriteOp::Patch {
            collection: collection.to_owned(),
            key: key.to_owned(),
            fields,
        });
    }

    pub fn delete(&mut self, collection: &str, key: &str) {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_owned(),
            key: key.to_owned(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Consume the batch into its staged ops, in staging order.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

///
/// Subscription
///
/// Cancellation handle for a document subscription. Cancel explicitly before
/// re-subscribing the same UI slot; dropping the handle also cancels.
///

pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Terminate the subscription now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
