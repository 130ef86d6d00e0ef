use crate::{
    store::{
        StoreError,
        contract::{Cursor, DocumentObserver, DocumentStore, ScanPage, Subscription, WriteBatch, WriteOp},
    },
    types::{Record, Value},
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

type Collections = BTreeMap<String, BTreeMap<String, Record>>;

///
/// MemoryStore
///
/// Reference store over in-process maps. Single-threaded; notifications are
/// delivered synchronously after a mutation completes, outside any internal
/// borrow, so observers may call back into the store.
///

#[derive(Default)]
pub struct MemoryStore {
    collections: RefCell<Collections>,
    watchers: Rc<RefCell<WatcherTable>>,
    fail_next_commit: Cell<bool>,
}

#[derive(Default)]
struct WatcherTable {
    next_id: u64,
    entries: Vec<WatchEntry>,
}

struct WatchEntry {
    id: u64,
    collection: String,
    key: String,
    observer: Rc<dyn DocumentObserver>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail with no mutation applied. Used to exercise
    /// the all-or-nothing guarantee in tests.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.set(true);
    }

    /// Number of documents currently in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .borrow()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    // Deliver the current state of each touched document to its watchers.
    // Observer lists are collected under the borrow and invoked after it is
    // released.
    fn notify(&self, touched: &[(String, String)]) {
        let mut pending: Vec<(Rc<dyn DocumentObserver>, Option<Record>)> = Vec::new();
        {
            let collections = self.collections.borrow();
            let watchers = self.watchers.borrow();
            for (collection, key) in touched {
                let snapshot = collections
                    .get(collection)
                    .and_then(|docs| docs.get(key))
                    .cloned();
                for entry in &watchers.entries {
                    if entry.collection == *collection && entry.key == *key {
                        pending.push((Rc::clone(&entry.observer), snapshot.clone()));
                    }
                }
            }
        }

        for (observer, snapshot) in pending {
            observer.on_change(snapshot.as_ref());
        }
    }

    fn apply(collections: &mut Collections, op: WriteOp) -> Result<(String, String), StoreError> {
        match op {
            WriteOp::Put {
                collection,
                key,
                record,
            } => {
                collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(key.clone(), record);

                Ok((collection, key))
            }
            WriteOp::Patch {
                collection,
                key,
                fields,
            } => {
                let doc = collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.get_mut(&key))
                    .ok_or_else(|| StoreError::not_found(&collection, &key))?;
                for (name, value) in fields {
                    doc.insert(name, value);
                }

                Ok((collection, key))
            }
            WriteOp::Delete { collection, key } => {
                if let Some(docs) = collections.get_mut(&collection) {
                    docs.remove(&key);
                }

                Ok((collection, key))
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    fn put(&self, collection: &str, key: &str, record: Record) -> Result<(), StoreError> {
        let touched = {
            let mut collections = self.collections.borrow_mut();
            Self::apply(
                &mut collections,
                WriteOp::Put {
                    collection: collection.to_owned(),
                    key: key.to_owned(),
                    record,
                },
            )?
        };
        self.notify(&[touched]);

        Ok(())
    }

    fn patch(&self, collection: &str, key: &str, fields: Record) -> Result<(), StoreError> {
        let touched = {
            let mut collections = self.collections.borrow_mut();
            Self::apply(
                &mut collections,
                WriteOp::Patch {
                    collection: collection.to_owned(),
                    key: key.to_owned(),
                    fields,
                },
            )?
        };
        self.notify(&[touched]);

        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let existed = {
            let mut collections = self.collections.borrow_mut();
            collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(key))
                .is_some()
        };
        if existed {
            self.notify(&[(collection.to_owned(), key.to_owned())]);
        }

        Ok(())
    }

    fn scan(
        &self,
        collection: &str,
        order_field: &str,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<ScanPage, StoreError> {
        let collections = self.collections.borrow();
        let mut docs: Vec<(String, Record)> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, rec)| (key.clone(), rec.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let order_value = |rec: &Record| rec.get(order_field).cloned().unwrap_or(Value::Null);
        docs.sort_by(|(ka, a), (kb, b)| order_value(a).cmp(&order_value(b)).then(ka.cmp(kb)));

        let start = cursor.map_or(0, |cursor| {
            docs.partition_point(|(_, rec)| order_value(rec) < cursor.0)
        });
        let end = docs.len().min(start.saturating_add(limit));
        let next = docs
            .get(end)
            .filter(|_| end < docs.len())
            .map(|(_, rec)| Cursor(order_value(rec)));
        let records = docs.drain(start..end).collect();

        Ok(ScanPage { records, next })
    }

    fn query_equals(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Record)>, StoreError> {
        let collections = self.collections.borrow();
        let matches = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, rec)| rec.get(field) == Some(value))
                    .map(|(key, rec)| (key.clone(), rec.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(matches)
    }

    fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Record)>, StoreError> {
        let collections = self.collections.borrow();
        let matches = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, rec)| {
                        rec.get(field)
                            .and_then(Value::as_list)
                            .is_some_and(|items| items.contains(value))
                    })
                    .map(|(key, rec)| (key.clone(), rec.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(matches)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail_next_commit.replace(false) {
            return Err(StoreError::CommitFailed("simulated commit failure".into()));
        }

        // Apply against a working copy; swap in only if every op succeeds.
        let touched = {
            let mut collections = self.collections.borrow_mut();
            let mut working = collections.clone();
            let mut touched: Vec<(String, String)> = Vec::new();
            for op in batch.into_ops() {
                let doc = Self::apply(&mut working, op)?;
                if !touched.contains(&doc) {
                    touched.push(doc);
                }
            }
            *collections = working;

            touched
        };
        self.notify(&touched);

        Ok(())
    }

    fn subscribe(
        &self,
        collection: &str,
        key: &str,
        observer: Rc<dyn DocumentObserver>,
    ) -> Result<Subscription, StoreError> {
        let id = {
            let mut watchers = self.watchers.borrow_mut();
            let id = watchers.next_id;
            watchers.next_id += 1;
            watchers.entries.push(WatchEntry {
                id,
                collection: collection.to_owned(),
                key: key.to_owned(),
                observer,
            });

            id
        };

        let table = Rc::clone(&self.watchers);
        Ok(Subscription::new(move || {
            table.borrow_mut().entries.retain(|entry| entry.id != id);
        }))
    }
}
