use crate::{
    db::Db,
    error::Error,
    model::Entity,
    store::{StoreError, WriteBatch},
};
use std::marker::PhantomData;
use tracing::{debug, info, warn};

///
/// Retract
///
/// An entity type that can be destroyed. `retract` stages whatever dependent
/// cleanup the deletion requires (cascades, embedded-reference repair) into
/// the batch that also carries the deletion itself, or rejects the deletion
/// outright while strong references remain.
///

pub trait Retract: Entity {
    fn retract(db: &Db<'_>, batch: &mut WriteBatch, doomed: &Self) -> Result<(), Error> {
        let _ = (db, batch, doomed);

        Ok(())
    }
}

///
/// DeleteExecutor
///
/// No dangling references survive a committed delete: cleanup and deletion
/// become visible together or not at all.
///

#[derive(Clone, Copy)]
pub struct DeleteExecutor<'a, E: Retract> {
    db: Db<'a>,
    debug: bool,
    _marker: PhantomData<E>,
}

impl<'a, E: Retract> DeleteExecutor<'a, E> {
    #[must_use]
    pub const fn new(db: Db<'a>, debug: bool) -> Self {
        Self {
            db,
            debug,
            _marker: PhantomData,
        }
    }

    pub fn execute(&self, key: &str) -> Result<(), Error> {
        let result = self.try_execute(key);
        if let Err(err) = &result {
            warn!(item = E::ITEM, key, %err, "delete failed");
        }

        result
    }

    fn try_execute(&self, key: &str) -> Result<(), Error> {
        let rec = self
            .db
            .store()
            .get(E::COLLECTION, key)?
            .ok_or_else(|| StoreError::not_found(E::COLLECTION, key))?;
        let doomed = E::from_record(&rec)?;

        let mut batch = WriteBatch::new();
        E::retract(&self.db, &mut batch, &doomed)?;
        batch.delete(E::COLLECTION, key);
        let staged_ops = batch.len();
        self.db.store().commit(batch)?;

        if self.debug {
            debug!(item = E::ITEM, key, staged_ops, "delete batch committed");
        }
        info!(item = E::ITEM, key, "record deleted");

        Ok(())
    }
}
