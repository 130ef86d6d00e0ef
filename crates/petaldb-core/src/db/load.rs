use crate::{
    db::Db,
    error::Error,
    model::Entity,
    store::Cursor,
};
use std::marker::PhantomData;
use tracing::{debug, info};

/// Block size for paginated listings.
pub const DEFAULT_BLOCK: usize = 21;

///
/// LoadExecutor
///

#[derive(Clone, Copy)]
pub struct LoadExecutor<'a, E: Entity> {
    db: Db<'a>,
    debug: bool,
    _marker: PhantomData<E>,
}

impl<'a, E: Entity> LoadExecutor<'a, E> {
    #[must_use]
    pub const fn new(db: Db<'a>, debug: bool) -> Self {
        Self {
            db,
            debug,
            _marker: PhantomData,
        }
    }

    /// Load one entity by key. Absence is not an error.
    pub fn one(&self, key: &str) -> Result<Option<E>, Error> {
        match self.db.store().get(E::COLLECTION, key)? {
            Some(rec) => {
                let entity = E::from_record(&rec)?;
                if self.debug {
                    debug!(item = E::ITEM, key, "record retrieved");
                }

                Ok(Some(entity))
            }
            None => {
                info!(item = E::ITEM, key, "no record with this key");

                Ok(None)
            }
        }
    }

    /// Load the whole collection, ordered by the entity's default field.
    pub fn all(&self) -> Result<Vec<E>, Error> {
        let mut out = Vec::new();
        let mut cursor: Option<Cursor> = None;
        loop {
            let page =
                self.db
                    .store()
                    .scan(E::COLLECTION, E::ORDER_FIELD, DEFAULT_BLOCK, cursor.as_ref())?;
            for (_, rec) in page.records {
                out.push(E::from_record(&rec)?);
            }
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        info!(item = E::ITEM, count = out.len(), "records retrieved");

        Ok(out)
    }

    /// Load one block for a paginated listing, restartable via the returned
    /// cursor.
    pub fn block(
        &self,
        order_field: &str,
        cursor: Option<&Cursor>,
    ) -> Result<(Vec<E>, Option<Cursor>), Error> {
        let page = self
            .db
            .store()
            .scan(E::COLLECTION, order_field, DEFAULT_BLOCK, cursor)?;
        let mut out = Vec::with_capacity(page.records.len());
        for (_, rec) in page.records {
            out.push(E::from_record(&rec)?);
        }
        if self.debug {
            debug!(item = E::ITEM, count = out.len(), order_field, "block retrieved");
        }

        Ok((out, page.next))
    }
}
