use crate::{
    db::{Db, delete::Retract, propagate},
    error::Error,
    model::{Entity, RecordId, Reference, shop::order::LineEntry, shop::product::Product},
    store::WriteBatch,
    types::{DecodeError, Record, Value, decode},
};
use petaldb_base::{
    ConstraintViolation,
    validator::{Validator, num::Positive},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod fields {
    pub const LINE_ID: &str = "line_id";
    pub const PRODUCT_REF: &str = "product_ref";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const AMOUNT: &str = "amount";
    pub const TOTAL: &str = "total";
}

///
/// OrderLineSlots
///
/// Creation input. The snapshot fields (`product_name`, `total`) are not
/// accepted from the caller; they are derived from the referenced product
/// when the line is hydrated.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OrderLineSlots {
    #[serde(default)]
    pub line_id: Option<u32>,
    #[serde(default)]
    pub product_ref: String,
    #[serde(default)]
    pub amount: Option<u32>,
}

///
/// OrderLine
///
/// An independently addressable line item referencing a product and carrying
/// a denormalized snapshot of the product's name and the line total (unit
/// price × amount) as of the last propagation.
///

#[derive(Clone, Debug, PartialEq)]
pub struct OrderLine {
    line_id: u32,
    product_ref: RecordId,
    product_name: String,
    amount: u32,
    total: Decimal,
}

impl OrderLine {
    pub fn new(slots: OrderLineSlots) -> Result<Self, ConstraintViolation> {
        let line_id = Self::check_line_id(slots.line_id)?;
        let product_ref = RecordId::parse(&slots.product_ref, "product")?;
        let amount = Self::check_amount(slots.amount)?;

        Ok(Self {
            line_id,
            product_ref,
            product_name: String::new(),
            amount,
            total: Decimal::ZERO,
        })
    }

    pub fn check_line_id(id: Option<u32>) -> Result<u32, ConstraintViolation> {
        let id = id.ok_or_else(|| {
            ConstraintViolation::mandatory("a value for the line ID must be provided")
        })?;
        Positive::new("line ID").validate(&id)?;

        Ok(id)
    }

    pub fn check_amount(amount: Option<u32>) -> Result<u32, ConstraintViolation> {
        let amount =
            amount.ok_or_else(|| ConstraintViolation::mandatory("an amount must be provided"))?;
        Positive::new("amount").validate(&amount)?;

        Ok(amount)
    }

    /// The embedded tuple this line contributes to an order.
    #[must_use]
    pub fn entry(&self) -> LineEntry {
        LineEntry {
            id: self.line_id,
            name: self.product_name.clone(),
            amount: self.amount,
            price: self.total,
        }
    }

    // Re-take the snapshot fields from the (current) source product.
    pub(crate) fn resnapshot(&mut self, product: &Product) {
        self.product_name = product.name().to_owned();
        self.total = product.price() * Decimal::from(self.amount);
    }

    #[must_use]
    pub const fn line_id(&self) -> u32 {
        self.line_id
    }

    #[must_use]
    pub const fn product_ref(&self) -> &RecordId {
        &self.product_ref
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }
}

impl Entity for OrderLine {
    const COLLECTION: &'static str = "order_lines";
    const ITEM: &'static str = "order line";
    const ORDER_FIELD: &'static str = fields::LINE_ID;

    fn key(&self) -> String {
        self.line_id.to_string()
    }

    fn describe(&self) -> String {
        format!("{} (ID: {})", self.product_name, self.line_id)
    }

    fn to_record(&self) -> Record {
        Record::from([
            (fields::LINE_ID.to_owned(), Value::from(self.line_id)),
            (
                fields::PRODUCT_REF.to_owned(),
                Value::from(self.product_ref.as_str()),
            ),
            (
                fields::PRODUCT_NAME.to_owned(),
                Value::from(self.product_name.as_str()),
            ),
            (fields::AMOUNT.to_owned(), Value::from(self.amount)),
            (fields::TOTAL.to_owned(), Value::from(self.total)),
        ])
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            line_id: decode::nat_field(rec, fields::LINE_ID)?,
            product_ref: RecordId::trusted(decode::text_field(rec, fields::PRODUCT_REF)?),
            product_name: decode::text_field(rec, fields::PRODUCT_NAME)?,
            amount: decode::nat_field(rec, fields::AMOUNT)?,
            total: decode::decimal_field(rec, fields::TOTAL)?,
        })
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::new(
            Product::COLLECTION,
            Product::ITEM,
            self.product_ref.to_string(),
        )]
    }

    // Take the name/price snapshot from the referenced product. Runs after
    // the reference check, so the product is known to exist.
    fn hydrate(&mut self, db: &Db<'_>) -> Result<(), Error> {
        let rec = db
            .store()
            .get(Product::COLLECTION, self.product_ref.as_str())?
            .ok_or_else(|| {
                ConstraintViolation::referential_integrity(format!(
                    "there is no product record with ID {}",
                    self.product_ref
                ))
            })?;
        let product = Product::from_record(&rec)?;
        self.resnapshot(&product);

        Ok(())
    }
}

impl Retract for OrderLine {
    // Detach this line's embedded entry from every order before the line
    // document itself goes.
    fn retract(db: &Db<'_>, batch: &mut WriteBatch, doomed: &Self) -> Result<(), Error> {
        propagate::strip_line_from_orders(db, batch, &doomed.entry())
    }
}
