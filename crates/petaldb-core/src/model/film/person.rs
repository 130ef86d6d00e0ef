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
    ConstraintViolation,
    validator::{Validator, text::NonEmpty},
};
use serde::{Deserialize, Serialize};

pub mod fields {
    pub const PERSON_ID: &str = "person_id";
    pub const NAME: &str = "name";
    pub const BIOGRAPHY: &str = "biography";
}

///
/// PersonSlots
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PersonSlots {
    #[serde(default)]
    pub person_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
}

///
/// PersonCard
///
/// The shared identity block for person-like entities: identity, name, and
/// an optional biography. Role types embed a card instead of inheriting from
/// a person base class; the identity validation lives here once.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PersonCard {
    person_id: RecordId,
    name: String,
    biography: Option<String>,
}

impl PersonCard {
    pub fn new(slots: PersonSlots) -> Result<Self, ConstraintViolation> {
        let person_id = RecordId::parse(&slots.person_id, "person")?;
        Self::check_name(&slots.name)?;

        Ok(Self {
            person_id,
            name: slots.name,
            biography: slots.biography,
        })
    }

    pub fn check_name(name: &str) -> Result<(), ConstraintViolation> {
        if name.is_empty() {
            return Err(ConstraintViolation::mandatory("a name must be provided"));
        }

        NonEmpty::new("name").validate(name)
    }

    #[must_use]
    pub const fn person_id(&self) -> &RecordId {
        &self.person_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn biography(&self) -> Option<&str> {
        self.biography.as_deref()
    }

    fn describe(&self) -> String {
        format!("{} (ID: {})", self.name, self.person_id)
    }

    fn to_record(&self) -> Record {
        let mut rec = Record::from([
            (
                fields::PERSON_ID.to_owned(),
                Value::from(self.person_id.as_str()),
            ),
            (fields::NAME.to_owned(), Value::from(self.name.as_str())),
        ]);
        if let Some(biography) = &self.biography {
            rec.insert(fields::BIOGRAPHY.to_owned(), Value::from(biography.as_str()));
        }

        rec
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            person_id: RecordId::trusted(decode::text_field(rec, fields::PERSON_ID)?),
            name: decode::text_field(rec, fields::NAME)?,
            biography: decode::opt_text_field(rec, fields::BIOGRAPHY)?,
        })
    }
}

///
/// PersonLike
///
/// Capability: "has a person identity". Executors and views needing only
/// the shared identity fields take this instead of a concrete role type.
///

pub trait PersonLike {
    fn card(&self) -> &PersonCard;

    fn person_id(&self) -> &RecordId {
        self.card().person_id()
    }

    fn name(&self) -> &str {
        self.card().name()
    }
}

///
/// PersonPatch
///
/// Shared update input for person-like entities. The identity is not
/// updatable; the biography is unchecked, matching its unvalidated setter
/// in the source model.
///

#[derive(Clone, Debug, Default)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub biography: Option<String>,
}

// Shared staging for the card fields of a person-like entity.
fn stage_card<E>(staged: &mut Staged<E>, card: &mut PersonCard, current: &PersonCard, patch: &PersonPatch) -> Result<(), Error>
where
    E: Entity,
{
    if let Some(name) = &patch.name {
        if *name != current.name {
            PersonCard::check_name(name)?;
            card.name.clone_from(name);
            staged.set(fields::NAME, Value::from(name.as_str()));
        }
    }
    if let Some(biography) = &patch.biography {
        if Some(biography.as_str()) != current.biography() {
            card.biography = Some(biography.clone());
            staged.set(fields::BIOGRAPHY, Value::from(biography.as_str()));
        }
    }

    Ok(())
}

///
/// Director
///

#[derive(Clone, Debug, PartialEq)]
pub struct Director {
    card: PersonCard,
}

impl Director {
    pub fn new(slots: PersonSlots) -> Result<Self, ConstraintViolation> {
        Ok(Self {
            card: PersonCard::new(slots)?,
        })
    }
}

impl PersonLike for Director {
    fn card(&self) -> &PersonCard {
        &self.card
    }
}

impl Entity for Director {
    const COLLECTION: &'static str = "directors";
    const ITEM: &'static str = "director";
    const ORDER_FIELD: &'static str = fields::PERSON_ID;

    fn key(&self) -> String {
        self.card.person_id.to_string()
    }

    fn describe(&self) -> String {
        self.card.describe()
    }

    fn to_record(&self) -> Record {
        self.card.to_record()
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            card: PersonCard::from_record(rec)?,
        })
    }
}

impl Mutable for Director {
    type Patch = PersonPatch;

    fn stage(_db: &Db<'_>, current: &Self, patch: &Self::Patch) -> Result<Staged<Self>, Error> {
        let mut staged = Staged::new(current.clone());
        let mut card = staged.after.card.clone();
        stage_card(&mut staged, &mut card, &current.card, patch)?;
        staged.after.card = card;

        Ok(staged)
    }
}

impl Retract for Director {
    // A movie's director reference is mandatory: deleting a referenced
    // director is rejected rather than repaired.
    fn retract(db: &Db<'_>, _batch: &mut WriteBatch, doomed: &Self) -> Result<(), Error> {
        propagate::guard_director_delete(db, doomed.person_id())
    }
}

///
/// Actor
///

#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    card: PersonCard,
}

impl Actor {
    pub fn new(slots: PersonSlots) -> Result<Self, ConstraintViolation> {
        Ok(Self {
            card: PersonCard::new(slots)?,
        })
    }
}

impl PersonLike for Actor {
    fn card(&self) -> &PersonCard {
        &self.card
    }
}

impl Entity for Actor {
    const COLLECTION: &'static str = "actors";
    const ITEM: &'static str = "actor";
    const ORDER_FIELD: &'static str = fields::PERSON_ID;

    fn key(&self) -> String {
        self.card.person_id.to_string()
    }

    fn describe(&self) -> String {
        self.card.describe()
    }

    fn to_record(&self) -> Record {
        self.card.to_record()
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            card: PersonCard::from_record(rec)?,
        })
    }
}

impl Mutable for Actor {
    type Patch = PersonPatch;

    fn stage(_db: &Db<'_>, current: &Self, patch: &Self::Patch) -> Result<Staged<Self>, Error> {
        let mut staged = Staged::new(current.clone());
        let mut card = staged.after.card.clone();
        stage_card(&mut staged, &mut card, &current.card, patch)?;
        staged.after.card = card;

        Ok(staged)
    }
}

impl Retract for Actor {
    // Actor membership in a movie is optional: repair the reference sets in
    // the same commit as the deletion.
    fn retract(db: &Db<'_>, batch: &mut WriteBatch, doomed: &Self) -> Result<(), Error> {
        propagate::strip_actor_from_movies(db, batch, doomed.person_id())
    }
}
