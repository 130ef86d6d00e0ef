pub mod film;
pub mod ident;
pub mod shop;


pub use ident::RecordId;

use crate::{
    db::Db,
    error::Error,
    types::{DecodeError, Record},
};

///
/// Entity
///
/// A uniquely identified, independently persisted record type. Constructing
/// an instance runs every local field check, so an instance is itself proof
/// that its fields satisfy local constraints; cross-entity constraints
/// (uniqueness, referential integrity) are confirmed against the store on
/// the persistence path.
///

pub trait Entity: Clone {
    /// Store collection holding this entity's documents.
    const COLLECTION: &'static str;

    /// Display noun for logs and change events.
    const ITEM: &'static str;

    /// Default ordering field for collection scans. Values must be unique
    /// within the collection for stable pagination.
    const ORDER_FIELD: &'static str;

    /// Document key within the collection.
    fn key(&self) -> String;

    /// Human-readable description for change events.
    fn describe(&self) -> String;

    /// Convert to the persisted record form. Derived in-memory types (dates,
    /// identities) convert to store-native values.
    fn to_record(&self) -> Record;

    /// Reconstruct from a persisted record. Stored records are trusted; this
    /// does not re-run field checks.
    fn from_record(rec: &Record) -> Result<Self, DecodeError>;

    /// Outbound references whose targets must exist when this entity is
    /// persisted.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Refresh denormalized snapshot fields from their source entities.
    /// Runs after reference checks, before first persistence.
    fn hydrate(&mut self, db: &Db<'_>) -> Result<(), Error> {
        let _ = db;

        Ok(())
    }
}

///
/// Reference
///
/// One outbound reference: the collection and key that must resolve, plus
/// the target's display noun for error messages.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reference {
    pub collection: &'static str,
    pub item: &'static str,
    pub key: String,
}

impl Reference {
    #[must_use]
    pub const fn new(collection: &'static str, item: &'static str, key: String) -> Self {
        Self {
            collection,
            item,
            key,
        }
    }
}
