use crate::{
    db::{
        Db,
        delete::Retract,
        update::{Mutable, Staged},
    },
    error::Error,
    model::{Entity, RecordId, Reference, shop::order_line::OrderLine},
    types::{DecodeError, Record, Value, decode},
};
use chrono::NaiveDate;
use petaldb_base::{
    ConstraintViolation,
    validator::{Validator, num::{Gte, Positive}, text::NonEmpty},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod fields {
    pub const ORDER_ID: &str = "order_id";
    pub const CUSTOMER_NAME: &str = "customer_name";
    pub const DATE_OF_PURCHASE: &str = "date_of_purchase";
    pub const DELIVERY_ADDRESS: &str = "delivery_address";
    pub const LINES: &str = "lines";
    pub const FINAL_PRICE: &str = "final_price";

    pub const ENTRY_ID: &str = "id";
    pub const ENTRY_NAME: &str = "name";
    pub const ENTRY_AMOUNT: &str = "amount";
    pub const ENTRY_PRICE: &str = "price";
}

///
/// LineEntry
///
/// The embedded snapshot tuple `{id, name, amount, price}` an order carries
/// for each of its lines. Matching during propagation is by exact-value
/// equality of the whole tuple.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LineEntry {
    pub id: u32,
    pub name: String,
    pub amount: u32,
    pub price: Decimal,
}

impl LineEntry {
    pub fn check(&self) -> Result<(), ConstraintViolation> {
        Positive::new("line ID").validate(&self.id)?;
        Positive::new("amount").validate(&self.amount)?;
        Gte::new("line price", Decimal::ZERO).validate(&self.price)?;

        Ok(())
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(Record::from([
            (fields::ENTRY_ID.to_owned(), Value::from(self.id)),
            (fields::ENTRY_NAME.to_owned(), Value::from(self.name.as_str())),
            (fields::ENTRY_AMOUNT.to_owned(), Value::from(self.amount)),
            (fields::ENTRY_PRICE.to_owned(), Value::from(self.price)),
        ]))
    }

    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let rec = value
            .as_map()
            .ok_or_else(|| DecodeError::new(fields::LINES, "entry must be a map"))?;

        Ok(Self {
            id: decode::nat_field(rec, fields::ENTRY_ID)?,
            name: decode::text_field(rec, fields::ENTRY_NAME)?,
            amount: decode::nat_field(rec, fields::ENTRY_AMOUNT)?,
            price: decode::decimal_field(rec, fields::ENTRY_PRICE)?,
        })
    }
}

///
/// OrderSlots
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OrderSlots {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub customer_name: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_of_purchase: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub lines: Vec<LineEntry>,
}

///
/// Order
///
/// The aggregate embedding line snapshots by value. `final_price` is derived
/// (sum of entry prices) and recomputed locally on every membership change
/// and propagation; caller input for it is never trusted.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    order_id: RecordId,
    customer_name: String,
    date_of_purchase: NaiveDate,
    delivery_address: String,
    lines: Vec<LineEntry>,
    final_price: Decimal,
}

impl Order {
    pub fn new(slots: OrderSlots) -> Result<Self, ConstraintViolation> {
        let order_id = RecordId::parse(&slots.order_id, "order")?;
        Self::check_customer_name(&slots.customer_name)?;
        let date_of_purchase = Self::check_date_of_purchase(&slots.date_of_purchase)?;
        Self::check_delivery_address(&slots.delivery_address)?;
        for entry in &slots.lines {
            entry.check()?;
        }

        let mut order = Self {
            order_id,
            customer_name: slots.customer_name,
            date_of_purchase,
            delivery_address: slots.delivery_address,
            lines: slots.lines,
            final_price: Decimal::ZERO,
        };
        order.recompute_final_price();

        Ok(order)
    }

    pub fn check_customer_name(name: &str) -> Result<(), ConstraintViolation> {
        if name.is_empty() {
            return Err(ConstraintViolation::mandatory(
                "a customer name must be provided",
            ));
        }

        NonEmpty::new("customer name").validate(name)
    }

    pub fn check_date_of_purchase(raw: &str) -> Result<NaiveDate, ConstraintViolation> {
        if raw.is_empty() {
            return Err(ConstraintViolation::mandatory(
                "a date of purchase must be provided",
            ));
        }

        raw.parse().map_err(|_| {
            ConstraintViolation::range(format!(
                "the date of purchase must be a calendar date (YYYY-MM-DD), got '{raw}'"
            ))
        })
    }

    pub fn check_delivery_address(address: &str) -> Result<(), ConstraintViolation> {
        if address.is_empty() {
            return Err(ConstraintViolation::mandatory(
                "a delivery address must be provided",
            ));
        }

        NonEmpty::new("delivery address").validate(address)
    }

    /// Append a line entry. Membership changes are first-class; the derived
    /// total follows.
    pub fn add_line(&mut self, entry: LineEntry) {
        self.lines.push(entry);
        self.recompute_final_price();
    }

    /// Remove the entries with the given line id. Returns whether anything
    /// was removed.
    pub fn remove_line(&mut self, id: u32) -> bool {
        let before = self.lines.len();
        self.lines.retain(|entry| entry.id != id);
        let removed = self.lines.len() != before;
        if removed {
            self.recompute_final_price();
        }

        removed
    }

    // Replace every entry equal to `old` with `new` (whole-tuple equality).
    pub(crate) fn replace_entries(&mut self, old: &LineEntry, new: &LineEntry) -> usize {
        let mut replaced = 0;
        for entry in &mut self.lines {
            if entry == old {
                *entry = new.clone();
                replaced += 1;
            }
        }
        if replaced > 0 {
            self.recompute_final_price();
        }

        replaced
    }

    // Drop every entry equal to `old` (whole-tuple equality).
    pub(crate) fn strip_entries(&mut self, old: &LineEntry) -> usize {
        let before = self.lines.len();
        self.lines.retain(|entry| entry != old);
        let stripped = before - self.lines.len();
        if stripped > 0 {
            self.recompute_final_price();
        }

        stripped
    }

    fn recompute_final_price(&mut self) {
        self.final_price = self.lines.iter().map(|entry| entry.price).sum();
    }

    // The patch fields a propagation rewrite touches: the embedded array and
    // the cached total.
    pub(crate) fn lines_fields(&self) -> Record {
        Record::from([
            (fields::LINES.to_owned(), self.lines_value()),
            (fields::FINAL_PRICE.to_owned(), Value::from(self.final_price)),
        ])
    }

    fn lines_value(&self) -> Value {
        Value::List(self.lines.iter().map(LineEntry::to_value).collect())
    }

    #[must_use]
    pub const fn order_id(&self) -> &RecordId {
        &self.order_id
    }

    #[must_use]
    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    #[must_use]
    pub const fn date_of_purchase(&self) -> NaiveDate {
        self.date_of_purchase
    }

    #[must_use]
    pub fn delivery_address(&self) -> &str {
        &self.delivery_address
    }

    #[must_use]
    pub fn lines(&self) -> &[LineEntry] {
        &self.lines
    }

    #[must_use]
    pub const fn final_price(&self) -> Decimal {
        self.final_price
    }
}

impl Entity for Order {
    const COLLECTION: &'static str = "orders";
    const ITEM: &'static str = "order";
    const ORDER_FIELD: &'static str = fields::ORDER_ID;

    fn key(&self) -> String {
        self.order_id.to_string()
    }

    fn describe(&self) -> String {
        format!("{} (ID: {})", self.customer_name, self.order_id)
    }

    fn to_record(&self) -> Record {
        Record::from([
            (
                fields::ORDER_ID.to_owned(),
                Value::from(self.order_id.as_str()),
            ),
            (
                fields::CUSTOMER_NAME.to_owned(),
                Value::from(self.customer_name.as_str()),
            ),
            (
                fields::DATE_OF_PURCHASE.to_owned(),
                Value::from_date(self.date_of_purchase),
            ),
            (
                fields::DELIVERY_ADDRESS.to_owned(),
                Value::from(self.delivery_address.as_str()),
            ),
            (fields::LINES.to_owned(), self.lines_value()),
            (fields::FINAL_PRICE.to_owned(), Value::from(self.final_price)),
        ])
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        let lines = decode::list_field(rec, fields::LINES)?
            .iter()
            .map(LineEntry::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            order_id: RecordId::trusted(decode::text_field(rec, fields::ORDER_ID)?),
            customer_name: decode::text_field(rec, fields::CUSTOMER_NAME)?,
            date_of_purchase: decode::date_field(rec, fields::DATE_OF_PURCHASE)?,
            delivery_address: decode::text_field(rec, fields::DELIVERY_ADDRESS)?,
            lines,
            final_price: decode::decimal_field(rec, fields::FINAL_PRICE)?,
        })
    }

    fn references(&self) -> Vec<Reference> {
        self.lines
            .iter()
            .map(|entry| {
                Reference::new(
                    OrderLine::COLLECTION,
                    OrderLine::ITEM,
                    entry.id.to_string(),
                )
            })
            .collect()
    }
}

///
/// OrderPatch
///
/// Field updates plus first-class line-membership operations. Added lines
/// are looked up (reference check) and their entries rebuilt from the line
/// documents; removed lines need no re-validation.
///

#[derive(Clone, Debug, Default)]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub date_of_purchase: Option<NaiveDate>,
    pub delivery_address: Option<String>,
    pub lines_to_add: Vec<u32>,
    pub lines_to_remove: Vec<u32>,
}

impl Mutable for Order {
    type Patch = OrderPatch;

    fn stage(db: &Db<'_>, current: &Self, patch: &Self::Patch) -> Result<Staged<Self>, Error> {
        let mut staged = Staged::new(current.clone());

        if let Some(name) = &patch.customer_name {
            if *name != current.customer_name {
                Self::check_customer_name(name)?;
                staged.after.customer_name.clone_from(name);
                staged.set(fields::CUSTOMER_NAME, Value::from(name.as_str()));
            }
        }
        if let Some(date) = patch.date_of_purchase {
            if date != current.date_of_purchase {
                staged.after.date_of_purchase = date;
                staged.set(fields::DATE_OF_PURCHASE, Value::from_date(date));
            }
        }
        if let Some(address) = &patch.delivery_address {
            if *address != current.delivery_address {
                Self::check_delivery_address(address)?;
                staged.after.delivery_address.clone_from(address);
                staged.set(fields::DELIVERY_ADDRESS, Value::from(address.as_str()));
            }
        }

        let mut membership_changed = false;
        for id in &patch.lines_to_add {
            let rec = db
                .store()
                .get(OrderLine::COLLECTION, &id.to_string())?
                .ok_or_else(|| {
                    ConstraintViolation::referential_integrity(format!(
                        "there is no order line record with ID {id}"
                    ))
                })?;
            let line = OrderLine::from_record(&rec)?;
            staged.after.add_line(line.entry());
            membership_changed = true;
        }
        for id in &patch.lines_to_remove {
            if staged.after.remove_line(*id) {
                membership_changed = true;
            }
        }
        if membership_changed {
            let lines = staged.after.lines_value();
            let final_price = staged.after.final_price;
            staged.set(fields::LINES, lines);
            staged.set(fields::FINAL_PRICE, Value::from(final_price));
        }

        Ok(staged)
    }
}

impl Retract for Order {}

#[cfg(test)]
mod tests {
    use super::{LineEntry, Order, OrderSlots};
    use crate::model::Entity;
    use petaldb_base::ConstraintViolation;
    use rust_decimal::Decimal;

    fn entry(id: u32, price: Decimal) -> LineEntry {
        LineEntry {
            id,
            name: "Tulip".into(),
            amount: 2,
            price,
        }
    }

    fn slots() -> OrderSlots {
        OrderSlots {
            order_id: "5".into(),
            customer_name: "Ada".into(),
            date_of_purchase: "2022-07-14".into(),
            delivery_address: "1 Main St".into(),
            lines: vec![entry(1, Decimal::new(190, 1)), entry(2, Decimal::new(95, 1))],
        }
    }

    #[test]
    fn final_price_is_derived_from_entries() {
        let order = Order::new(slots()).unwrap();
        assert_eq!(order.final_price(), Decimal::new(285, 1));
    }

    #[test]
    fn construction_rejects_bad_fields() {
        let mut bad = slots();
        bad.date_of_purchase = "tomorrow".into();
        assert!(matches!(
            Order::new(bad),
            Err(ConstraintViolation::Range(_))
        ));

        let mut bad = slots();
        bad.customer_name = String::new();
        assert!(matches!(
            Order::new(bad),
            Err(ConstraintViolation::Mandatory(_))
        ));

        let mut bad = slots();
        bad.lines[0].amount = 0;
        assert!(matches!(
            Order::new(bad),
            Err(ConstraintViolation::Range(_))
        ));
    }

    #[test]
    fn membership_ops_keep_the_total_current() {
        let mut order = Order::new(slots()).unwrap();
        order.add_line(entry(3, Decimal::new(50, 1)));
        assert_eq!(order.final_price(), Decimal::new(335, 1));

        assert!(order.remove_line(1));
        assert_eq!(order.final_price(), Decimal::new(145, 1));
        assert!(!order.remove_line(99));
    }

    #[test]
    fn replace_matches_the_whole_tuple() {
        let mut order = Order::new(slots()).unwrap();
        let old = entry(1, Decimal::new(190, 1));
        let new = LineEntry {
            price: Decimal::new(220, 1),
            ..old.clone()
        };

        assert_eq!(order.replace_entries(&old, &new), 1);
        assert_eq!(order.lines()[0].price, Decimal::new(220, 1));
        // a stale tuple that no longer matches replaces nothing
        assert_eq!(order.replace_entries(&old, &new), 0);
    }

    #[test]
    fn record_round_trip_preserves_line_order() {
        let order = Order::new(slots()).unwrap();
        let back = Order::from_record(&order.to_record()).unwrap();
        assert_eq!(back, order);
        assert_eq!(
            back.lines().iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
}
