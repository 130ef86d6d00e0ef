pub mod add;
pub mod delete;
pub mod load;
pub(crate) mod propagate;
pub mod update;

#[cfg(test)]
mod tests;

pub use add::AddExecutor;
pub use delete::{DeleteExecutor, Retract};
pub use load::{DEFAULT_BLOCK, LoadExecutor};
pub use update::{Mutable, Staged, UpdateExecutor, UpdateOutcome};

use crate::{
    error::Error,
    model::Entity,
    store::{Cursor, DocumentStore, Subscription},
    watch::{self, ChangeSink},
};
use std::rc::Rc;
use tracing::warn;

///
/// Db
///
/// A handle to the injected store adapter. Initialized once at session
/// start and passed into every entity operation; never a hidden global.
///

#[derive(Clone, Copy)]
pub struct Db<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> Db<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &'a dyn DocumentStore {
        self.store
    }
}

///
/// DbSession
/// Database handle plus a debug flag that controls executor verbosity.
///

pub struct DbSession<'a> {
    db: Db<'a>,
    debug: bool,
}

impl<'a> DbSession<'a> {
    #[must_use]
    /// Create a new session scoped to the provided database.
    pub const fn new(db: Db<'a>) -> Self {
        Self { db, debug: false }
    }

    #[must_use]
    /// Enable debug narration for subsequent operations in this session.
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn db(&self) -> Db<'a> {
        self.db
    }

    //
    // Low-level executors
    //

    /// Get a [`LoadExecutor`] for reading entities.
    #[must_use]
    pub const fn loader<E: Entity>(&self) -> LoadExecutor<'a, E> {
        LoadExecutor::new(self.db, self.debug)
    }

    /// Get an [`AddExecutor`] for creating entities.
    #[must_use]
    pub const fn adder<E: Entity>(&self) -> AddExecutor<'a, E> {
        AddExecutor::new(self.db, self.debug)
    }

    /// Get an [`UpdateExecutor`] for partial updates.
    #[must_use]
    pub const fn updater<E: Mutable>(&self) -> UpdateExecutor<'a, E> {
        UpdateExecutor::new(self.db, self.debug)
    }

    /// Get a [`DeleteExecutor`] for destroying entities.
    #[must_use]
    pub const fn deleter<E: Retract>(&self) -> DeleteExecutor<'a, E> {
        DeleteExecutor::new(self.db, self.debug)
    }

    //
    // High-level shortcuts
    //

    /// Persist a new, locally validated entity.
    pub fn add<E: Entity>(&self, entity: E) -> Result<E, Error> {
        self.adder::<E>().execute(entity)
    }

    /// Load one entity by key.
    pub fn retrieve<E: Entity>(&self, key: &str) -> Result<Option<E>, Error> {
        self.loader::<E>().one(key)
    }

    /// Load every entity of a collection, ordered by its default field.
    pub fn retrieve_all<E: Entity>(&self) -> Result<Vec<E>, Error> {
        self.loader::<E>().all()
    }

    /// Load one block of entities for paginated listings.
    pub fn retrieve_block<E: Entity>(
        &self,
        order_field: &str,
        cursor: Option<&Cursor>,
    ) -> Result<(Vec<E>, Option<Cursor>), Error> {
        self.loader::<E>().block(order_field, cursor)
    }

    /// Apply a partial update, propagating denormalized snapshots in the
    /// same commit.
    pub fn update<E: Mutable>(&self, key: &str, patch: &E::Patch) -> Result<UpdateOutcome<E>, Error> {
        self.updater::<E>().execute(key, patch)
    }

    /// Destroy an entity, cleaning up dependent embeddings in the same
    /// commit.
    pub fn destroy<E: Retract>(&self, key: &str) -> Result<(), Error> {
        self.deleter::<E>().execute(key)
    }

    /// Destroy every record of a collection. The caller has already decided;
    /// no confirmation happens here.
    pub fn clear<E: Retract>(&self) -> Result<usize, Error> {
        let entities = self.retrieve_all::<E>()?;
        let mut destroyed = 0;
        for entity in entities {
            match self.destroy::<E>(&entity.key()) {
                Ok(()) => destroyed += 1,
                // a cascade earlier in this sweep may already have taken it
                Err(err) if err.is_not_found() => {}
                Err(err) => {
                    warn!(item = E::ITEM, %err, "clear aborted");
                    return Err(err);
                }
            }
        }

        Ok(destroyed)
    }

    /// Watch one document for changes, reporting them to `sink`.
    pub fn observe<E: Entity>(
        &self,
        key: &str,
        sink: Rc<dyn ChangeSink>,
    ) -> Result<Subscription, Error> {
        watch::observe::<E>(&self.db, key, sink)
    }
}
