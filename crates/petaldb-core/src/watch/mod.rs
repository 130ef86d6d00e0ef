use crate::{
    db::Db,
    error::Error,
    model::Entity,
    store::{DocumentObserver, StoreError, Subscription},
    types::Record,
};
use std::{cell::RefCell, rc::Rc};
use tracing::warn;

///
/// ChangeKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChangeKind {
    Modified,
    Removed,
}

///
/// ChangeEvent
///
/// What the presentation collaborator is told about a watched document.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeEvent {
    pub item: &'static str,
    pub description: String,
    pub kind: ChangeKind,
}

///
/// ChangeSink
///
/// External presentation collaborator. Must not block; it is called
/// synchronously from the notification path.
///

pub trait ChangeSink {
    fn notify(&self, event: ChangeEvent);
}

/// Watch one document, classifying each pushed snapshot against the last
/// known copy: absent → `Removed`, value-different → `Modified` (and the
/// baseline refreshes to the pushed value). Equal snapshots emit nothing.
///
/// The returned handle must be cancelled before re-subscribing the same UI
/// slot and on teardown; dropping it also cancels.
pub fn observe<E: Entity>(
    db: &Db<'_>,
    key: &str,
    sink: Rc<dyn ChangeSink>,
) -> Result<Subscription, Error> {
    let rec = db
        .store()
        .get(E::COLLECTION, key)?
        .ok_or_else(|| StoreError::not_found(E::COLLECTION, key))?;
    let description = E::from_record(&rec)?.describe();

    let observer = Rc::new(Bridge {
        item: E::ITEM,
        description,
        baseline: RefCell::new(rec),
        sink,
    });

    db.store()
        .subscribe(E::COLLECTION, key, observer)
        .map_err(Error::from)
}

///
/// Bridge
///
/// Diffs each pushed snapshot against the baseline and forwards the
/// classification to the sink.
///

struct Bridge {
    item: &'static str,
    description: String,
    baseline: RefCell<Record>,
    sink: Rc<dyn ChangeSink>,
}

impl Bridge {
    fn emit(&self, kind: ChangeKind) {
        self.sink.notify(ChangeEvent {
            item: self.item,
            description: self.description.clone(),
            kind,
        });
    }
}

impl DocumentObserver for Bridge {
    fn on_change(&self, snapshot: Option<&Record>) {
        match snapshot {
            None => self.emit(ChangeKind::Removed),
            Some(rec) => {
                let changed = *rec != *self.baseline.borrow();
                if changed {
                    match self.baseline.try_borrow_mut() {
                        Ok(mut baseline) => *baseline = rec.clone(),
                        Err(_) => warn!(item = self.item, "baseline busy, skipping refresh"),
                    }
                    self.emit(ChangeKind::Modified);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeEvent, ChangeKind, ChangeSink};
    use crate::{
        db::{Db, DbSession},
        model::shop::product::{Product, ProductPatch, ProductSlots},
        store::MemoryStore,
    };
    use rust_decimal::Decimal;
    use std::{cell::RefCell, rc::Rc};

    struct Tape(RefCell<Vec<ChangeEvent>>);

    impl ChangeSink for Tape {
        fn notify(&self, event: ChangeEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    fn seeded_session(store: &MemoryStore) -> DbSession<'_> {
        let session = DbSession::new(Db::new(store));
        session
            .add(
                Product::new(ProductSlots {
                    product_id: "7".into(),
                    name: "Tulip".into(),
                    vase_size: Some(2),
                    category: Some(1),
                    price: Some(Decimal::new(95, 1)),
                })
                .unwrap(),
            )
            .unwrap();

        session
    }

    #[test]
    fn modified_and_removed_are_classified() {
        let store = MemoryStore::new();
        let session = seeded_session(&store);
        let tape = Rc::new(Tape(RefCell::new(Vec::new())));

        let sub = session
            .observe::<Product>("7", Rc::clone(&tape) as Rc<dyn ChangeSink>)
            .unwrap();

        let patch = ProductPatch {
            price: Some(Decimal::new(110, 1)),
            ..ProductPatch::default()
        };
        session.update::<Product>("7", &patch).unwrap();
        session.destroy::<Product>("7").unwrap();

        let events = tape.0.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ChangeKind::Modified);
        assert_eq!(events[0].item, "product");
        assert_eq!(events[0].description, "Tulip (ID: 7)");
        assert_eq!(events[1].kind, ChangeKind::Removed);
        drop(events);

        sub.cancel();
    }

    #[test]
    fn equal_snapshots_emit_nothing() {
        let store = MemoryStore::new();
        let session = seeded_session(&store);
        let tape = Rc::new(Tape(RefCell::new(Vec::new())));

        let _sub = session
            .observe::<Product>("7", Rc::clone(&tape) as Rc<dyn ChangeSink>)
            .unwrap();

        // a no-change update never reaches the store, so nothing is pushed
        let patch = ProductPatch {
            price: Some(Decimal::new(95, 1)),
            ..ProductPatch::default()
        };
        let outcome = session.update::<Product>("7", &patch).unwrap();
        assert!(outcome.is_unchanged());
        assert!(tape.0.borrow().is_empty());
    }

    #[test]
    fn cancelled_subscription_stays_silent() {
        let store = MemoryStore::new();
        let session = seeded_session(&store);
        let tape = Rc::new(Tape(RefCell::new(Vec::new())));

        session
            .observe::<Product>("7", Rc::clone(&tape) as Rc<dyn ChangeSink>)
            .unwrap()
            .cancel();

        session.destroy::<Product>("7").unwrap();
        assert!(tape.0.borrow().is_empty());
    }

    #[test]
    fn observing_an_absent_document_fails() {
        let store = MemoryStore::new();
        let session = seeded_session(&store);
        let tape = Rc::new(Tape(RefCell::new(Vec::new())));

        let err = session
            .observe::<Product>("404", tape as Rc<dyn ChangeSink>)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
