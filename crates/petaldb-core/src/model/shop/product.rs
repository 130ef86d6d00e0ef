use crate::{
    db::{
        Db,
        delete::Retract,
        propagate,
        update::{Mutable, Staged},
    },
    error::Error,
    model::{Entity, RecordId},
    store::WriteBatch,
    types::{DecodeError, Record, Value, decode},
};
use petaldb_base::{
    ConstraintViolation, Enumeration,
    validator::{Validator, num::Gte, text::NonEmpty},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vase sizes on offer; persisted as the 1-based index.
pub static VASE_SIZES: Enumeration = Enumeration::new(&["small", "medium", "large", "x-large"]);

/// Product categories; persisted as the 1-based index.
pub static CATEGORIES: Enumeration = Enumeration::new(&["Plant", "Vase"]);

pub mod fields {
    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    pub const VASE_SIZE: &str = "vase_size";
    pub const CATEGORY: &str = "category";
    pub const PRICE: &str = "price";
}

///
/// ProductSlots
///
/// Creation input. Every field check runs when a `Product` is constructed
/// from these slots.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProductSlots {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vase_size: Option<u32>,
    #[serde(default)]
    pub category: Option<u32>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

///
/// Product
///

#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    product_id: RecordId,
    name: String,
    vase_size: u32,
    category: u32,
    price: Decimal,
}

impl Product {
    /// Validate the slots and construct a candidate product, aborting on the
    /// first violation.
    pub fn new(slots: ProductSlots) -> Result<Self, ConstraintViolation> {
        let product_id = Self::check_product_id(&slots.product_id)?;
        Self::check_name(&slots.name)?;
        let vase_size = Self::check_vase_size(slots.vase_size)?;
        let category = Self::check_category(slots.category)?;
        let price = Self::check_price(slots.price)?;

        Ok(Self {
            product_id,
            name: slots.name,
            vase_size,
            category,
            price,
        })
    }

    pub fn check_product_id(raw: &str) -> Result<RecordId, ConstraintViolation> {
        RecordId::parse(raw, "product")
    }

    pub fn check_name(name: &str) -> Result<(), ConstraintViolation> {
        if name.is_empty() {
            return Err(ConstraintViolation::mandatory("a name must be provided"));
        }

        NonEmpty::new("name").validate(name)
    }

    pub fn check_vase_size(size: Option<u32>) -> Result<u32, ConstraintViolation> {
        let size = size
            .ok_or_else(|| ConstraintViolation::mandatory("a vase size must be provided"))?;
        VASE_SIZES.check(size, "vase size")?;

        Ok(size)
    }

    pub fn check_category(category: Option<u32>) -> Result<u32, ConstraintViolation> {
        let category = category
            .ok_or_else(|| ConstraintViolation::mandatory("a category must be provided"))?;
        CATEGORIES.check(category, "category")?;

        Ok(category)
    }

    pub fn check_price(price: Option<Decimal>) -> Result<Decimal, ConstraintViolation> {
        let price =
            price.ok_or_else(|| ConstraintViolation::mandatory("a price must be provided"))?;
        Gte::new("price", Decimal::ZERO).validate(&price)?;

        Ok(price)
    }

    #[must_use]
    pub const fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn vase_size(&self) -> u32 {
        self.vase_size
    }

    #[must_use]
    pub const fn category(&self) -> u32 {
        self.category
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const ITEM: &'static str = "product";
    const ORDER_FIELD: &'static str = fields::PRODUCT_ID;

    fn key(&self) -> String {
        self.product_id.to_string()
    }

    fn describe(&self) -> String {
        format!("{} (ID: {})", self.name, self.product_id)
    }

    fn to_record(&self) -> Record {
        Record::from([
            (
                fields::PRODUCT_ID.to_owned(),
                Value::from(self.product_id.as_str()),
            ),
            (fields::NAME.to_owned(), Value::from(self.name.as_str())),
            (fields::VASE_SIZE.to_owned(), Value::from(self.vase_size)),
            (fields::CATEGORY.to_owned(), Value::from(self.category)),
            (fields::PRICE.to_owned(), Value::from(self.price)),
        ])
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            product_id: RecordId::trusted(decode::text_field(rec, fields::PRODUCT_ID)?),
            name: decode::text_field(rec, fields::NAME)?,
            vase_size: decode::nat_field(rec, fields::VASE_SIZE)?,
            category: decode::nat_field(rec, fields::CATEGORY)?,
            price: decode::decimal_field(rec, fields::PRICE)?,
        })
    }
}

///
/// ProductPatch
///
/// Partial update input: only present fields are considered, and only
/// actually-changed fields are validated and persisted.
///

#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub vase_size: Option<u32>,
    pub category: Option<u32>,
    pub price: Option<Decimal>,
}

impl Mutable for Product {
    type Patch = ProductPatch;

    fn stage(
        _db: &Db<'_>,
        current: &Self,
        patch: &Self::Patch,
    ) -> Result<Staged<Self>, Error> {
        let mut staged = Staged::new(current.clone());

        if let Some(name) = &patch.name {
            if *name != current.name {
                Self::check_name(name)?;
                staged.after.name.clone_from(name);
                staged.set(fields::NAME, Value::from(name.as_str()));
            }
        }
        if let Some(size) = patch.vase_size {
            if size != current.vase_size {
                Self::check_vase_size(Some(size))?;
                staged.after.vase_size = size;
                staged.set(fields::VASE_SIZE, Value::from(size));
            }
        }
        if let Some(category) = patch.category {
            if category != current.category {
                Self::check_category(Some(category))?;
                staged.after.category = category;
                staged.set(fields::CATEGORY, Value::from(category));
            }
        }
        if let Some(price) = patch.price {
            if price != current.price {
                Self::check_price(Some(price))?;
                staged.after.price = price;
                staged.set(fields::PRICE, Value::from(price));
            }
        }

        Ok(staged)
    }

    // A name or price change feeds the line snapshots and, through them, the
    // embedded order entries.
    fn propagate(
        db: &Db<'_>,
        batch: &mut WriteBatch,
        before: &Self,
        after: &Self,
    ) -> Result<(), Error> {
        propagate::product_snapshots(db, batch, before, after)
    }
}

impl Retract for Product {
    // Deleting a product cascades to its order lines, which in turn detach
    // from any embedding order.
    fn retract(db: &Db<'_>, batch: &mut WriteBatch, doomed: &Self) -> Result<(), Error> {
        propagate::product_cascade(db, batch, doomed)
    }
}
