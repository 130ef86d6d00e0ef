use crate::{
    db::Db,
    error::Error,
    model::Entity,
    store::{StoreError, WriteBatch},
    types::{Record, Value},
};
use std::marker::PhantomData;
use tracing::{debug, info, warn};

///
/// Mutable
///
/// An entity type that supports partial updates. `stage` compares the patch
/// against the current state, validates only the fields that actually
/// change, and returns the staged change set; `propagate` stages rewrites of
/// denormalized copies in other collections into the same batch.
///

pub trait Mutable: Entity {
    type Patch;

    fn stage(db: &Db<'_>, current: &Self, patch: &Self::Patch) -> Result<Staged<Self>, Error>;

    fn propagate(
        db: &Db<'_>,
        batch: &mut WriteBatch,
        before: &Self,
        after: &Self,
    ) -> Result<(), Error> {
        let _ = (db, batch, before, after);

        Ok(())
    }
}

///
/// Staged
///
/// The outcome of staging: the post-update entity, the record of changed
/// fields (only these are persisted), and their names in staging order.
///

pub struct Staged<E> {
    pub after: E,
    pub fields: Record,
    pub changed: Vec<&'static str>,
}

impl<E> Staged<E> {
    #[must_use]
    pub fn new(after: E) -> Self {
        Self {
            after,
            fields: Record::new(),
            changed: Vec::new(),
        }
    }

    /// Stage one changed field.
    pub fn set(&mut self, field: &'static str, value: Value) {
        self.fields.insert(field.to_owned(), value);
        self.changed.push(field);
    }

    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.fields.is_empty()
    }
}

///
/// UpdateOutcome
///

#[derive(Debug)]
pub enum UpdateOutcome<E> {
    Updated {
        entity: E,
        changed: Vec<&'static str>,
    },
    /// No supplied field differed from the stored state; the store was not
    /// touched.
    Unchanged,
}

impl<E> UpdateOutcome<E> {
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

///
/// UpdateExecutor
///
/// All staging and validation completes before anything is committed; the
/// entity's own patch and every propagation rewrite land in one atomic
/// batch.
///

#[derive(Clone, Copy)]
pub struct UpdateExecutor<'a, E: Mutable> {
    db: Db<'a>,
    debug: bool,
    _marker: PhantomData<E>,
}

impl<'a, E: Mutable> UpdateExecutor<'a, E> {
    #[must_use]
    pub const fn new(db: Db<'a>, debug: bool) -> Self {
        Self {
            db,
            debug,
            _marker: PhantomData,
        }
    }

    pub fn execute(&self, key: &str, patch: &E::Patch) -> Result<UpdateOutcome<E>, Error> {
        let result = self.try_execute(key, patch);
        if let Err(err) = &result {
            warn!(item = E::ITEM, key, %err, "update failed");
        }

        result
    }

    fn try_execute(&self, key: &str, patch: &E::Patch) -> Result<UpdateOutcome<E>, Error> {
        let rec = self
            .db
            .store()
            .get(E::COLLECTION, key)?
            .ok_or_else(|| StoreError::not_found(E::COLLECTION, key))?;
        let current = E::from_record(&rec)?;

        let staged = E::stage(&self.db, &current, patch)?;
        if staged.is_unchanged() {
            info!(item = E::ITEM, key, "no property value changed");

            return Ok(UpdateOutcome::Unchanged);
        }

        let mut batch = WriteBatch::new();
        batch.patch(E::COLLECTION, key, staged.fields);
        E::propagate(&self.db, &mut batch, &current, &staged.after)?;
        let staged_ops = batch.len();
        self.db.store().commit(batch)?;

        if self.debug {
            debug!(item = E::ITEM, key, staged_ops, "update batch committed");
        }
        info!(
            item = E::ITEM,
            key,
            changed = ?staged.changed,
            "properties modified"
        );

        Ok(UpdateOutcome::Updated {
            entity: staged.after,
            changed: staged.changed,
        })
    }
}
