//! Association upkeep: keeping embedded snapshots consistent with their
//! source entities, and keeping back-references consistent on deletion.
//!
//! Every function here only *stages* mutations; the calling executor commits
//! the batch, so one logical propagation is always one atomic commit.

use crate::{
    db::Db,
    error::Error,
    model::{
        Entity, RecordId,
        film::movie::{Movie, fields as movie_fields},
        shop::{
            order::{LineEntry, Order, fields as order_fields},
            order_line::{OrderLine, fields as line_fields},
            product::Product,
        },
    },
    store::WriteBatch,
    types::{Record, Value},
};
use std::collections::BTreeMap;
use tracing::debug;

// Decode each embedding order once, apply every rewrite to the in-memory
// copy, and stage a single patch per order. Staging per match instead would
// lose all but the last rewrite when one order embeds several lines of the
// same product.
struct TouchedOrders {
    orders: BTreeMap<String, Order>,
}

impl TouchedOrders {
    fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
        }
    }

    fn entry(&mut self, key: String, rec: &Record) -> Result<&mut Order, Error> {
        if !self.orders.contains_key(&key) {
            self.orders.insert(key.clone(), Order::from_record(rec)?);
        }

        Ok(self
            .orders
            .get_mut(&key)
            .expect("order inserted on the line above"))
    }

    fn stage(self, batch: &mut WriteBatch) {
        for (key, order) in &self.orders {
            batch.patch(Order::COLLECTION, key, order.lines_fields());
        }
    }
}

/// Source-field change on a product: re-snapshot every dependent line and
/// replace the stale embedded tuple in every order that carries it.
pub(crate) fn product_snapshots(
    db: &Db<'_>,
    batch: &mut WriteBatch,
    before: &Product,
    after: &Product,
) -> Result<(), Error> {
    let name_changed = before.name() != after.name();
    let price_changed = before.price() != after.price();
    if !name_changed && !price_changed {
        return Ok(());
    }

    let lines = db.store().query_equals(
        OrderLine::COLLECTION,
        line_fields::PRODUCT_REF,
        &Value::from(before.product_id().as_str()),
    )?;
    let mut touched = TouchedOrders::new();

    for (line_key, line_rec) in lines {
        let line = OrderLine::from_record(&line_rec)?;
        let old_entry = line.entry();
        let mut updated = line;
        updated.resnapshot(after);
        let new_entry = updated.entry();

        let mut fields = Record::new();
        if name_changed {
            fields.insert(
                line_fields::PRODUCT_NAME.to_owned(),
                Value::from(after.name()),
            );
        }
        if price_changed {
            fields.insert(line_fields::TOTAL.to_owned(), Value::from(updated.total()));
        }
        batch.patch(OrderLine::COLLECTION, &line_key, fields);

        // Membership lookup by the whole stale tuple; two orders carrying an
        // identical tuple both rewrite to the identical new one.
        for (order_key, order_rec) in db.store().query_array_contains(
            Order::COLLECTION,
            order_fields::LINES,
            &old_entry.to_value(),
        )? {
            let order = touched.entry(order_key, &order_rec)?;
            order.replace_entries(&old_entry, &new_entry);
        }
    }

    debug!(
        product = %after.product_id(),
        orders = touched.orders.len(),
        "staged snapshot propagation"
    );
    touched.stage(batch);

    Ok(())
}

/// Delete-side cascade for a product: its lines go with it, and each line's
/// embedded entry is stripped from every order carrying it.
pub(crate) fn product_cascade(
    db: &Db<'_>,
    batch: &mut WriteBatch,
    doomed: &Product,
) -> Result<(), Error> {
    let lines = db.store().query_equals(
        OrderLine::COLLECTION,
        line_fields::PRODUCT_REF,
        &Value::from(doomed.product_id().as_str()),
    )?;
    let mut touched = TouchedOrders::new();

    for (line_key, line_rec) in lines {
        let line = OrderLine::from_record(&line_rec)?;
        let entry = line.entry();
        for (order_key, order_rec) in db.store().query_array_contains(
            Order::COLLECTION,
            order_fields::LINES,
            &entry.to_value(),
        )? {
            let order = touched.entry(order_key, &order_rec)?;
            order.strip_entries(&entry);
        }
        batch.delete(OrderLine::COLLECTION, &line_key);
    }

    touched.stage(batch);

    Ok(())
}

/// Delete-side repair for a single line: detach its embedded entry from
/// every order.
pub(crate) fn strip_line_from_orders(
    db: &Db<'_>,
    batch: &mut WriteBatch,
    entry: &LineEntry,
) -> Result<(), Error> {
    for (order_key, order_rec) in db.store().query_array_contains(
        Order::COLLECTION,
        order_fields::LINES,
        &entry.to_value(),
    )? {
        let mut order = Order::from_record(&order_rec)?;
        order.strip_entries(entry);
        batch.patch(Order::COLLECTION, &order_key, order.lines_fields());
    }

    Ok(())
}

/// Delete-side repair for an actor: drop the reference from every movie's
/// actor set.
pub(crate) fn strip_actor_from_movies(
    db: &Db<'_>,
    batch: &mut WriteBatch,
    actor_id: &RecordId,
) -> Result<(), Error> {
    for (movie_key, movie_rec) in db.store().query_array_contains(
        Movie::COLLECTION,
        movie_fields::ACTOR_REFS,
        &Value::from(actor_id.as_str()),
    )? {
        let mut movie = Movie::from_record(&movie_rec)?;
        movie.remove_actor(actor_id.as_str());
        batch.patch(Movie::COLLECTION, &movie_key, movie.actor_refs_fields());
    }

    Ok(())
}

/// A director is a mandatory reference: reject the delete while any movie
/// still names them.
pub(crate) fn guard_director_delete(db: &Db<'_>, director_id: &RecordId) -> Result<(), Error> {
    let dependents = db.store().query_equals(
        Movie::COLLECTION,
        movie_fields::DIRECTOR_REF,
        &Value::from(director_id.as_str()),
    )?;
    if dependents.is_empty() {
        Ok(())
    } else {
        Err(Error::Conflict(format!(
            "delete blocked by strong reference: {} movie record(s) still name director {director_id}",
            dependents.len()
        )))
    }
}
