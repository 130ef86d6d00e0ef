use crate::{
    db::Db,
    error::Error,
    model::Entity,
};
use petaldb_base::ConstraintViolation;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

///
/// AddExecutor
///
/// Creation pipeline: the candidate entity arrives locally validated (its
/// constructor ran every field check); this executor confirms the
/// store-dependent constraints and persists with a single document write.
/// Nothing is written on any failure.
///

#[derive(Clone, Copy)]
pub struct AddExecutor<'a, E: Entity> {
    db: Db<'a>,
    debug: bool,
    _marker: PhantomData<E>,
}

impl<'a, E: Entity> AddExecutor<'a, E> {
    #[must_use]
    pub const fn new(db: Db<'a>, debug: bool) -> Self {
        Self {
            db,
            debug,
            _marker: PhantomData,
        }
    }

    pub fn execute(&self, entity: E) -> Result<E, Error> {
        let key = entity.key();
        let result = self.try_execute(entity, &key);
        if let Err(err) = &result {
            warn!(item = E::ITEM, key, %err, "add failed");
        }

        result
    }

    fn try_execute(&self, mut entity: E, key: &str) -> Result<E, Error> {
        // Identity check: the key must not already be taken.
        if self.db.store().get(E::COLLECTION, key)?.is_some() {
            return Err(ConstraintViolation::uniqueness(format!(
                "there is already a {} record with ID {key}",
                E::ITEM
            ))
            .into());
        }

        // Referential integrity: every outbound reference must resolve.
        for reference in entity.references() {
            if self
                .db
                .store()
                .get(reference.collection, &reference.key)?
                .is_none()
            {
                return Err(ConstraintViolation::referential_integrity(format!(
                    "there is no {} record with ID {}",
                    reference.item, reference.key
                ))
                .into());
            }
        }

        // Snapshot fields are taken from their (now confirmed) sources.
        entity.hydrate(&self.db)?;

        if self.debug {
            debug!(item = E::ITEM, key, "checks passed, writing document");
        }
        self.db.store().put(E::COLLECTION, key, entity.to_record())?;
        info!(item = E::ITEM, key, "record created");

        Ok(entity)
    }
}
