use crate::{
    db::{
        Db,
        delete::Retract,
        update::{Mutable, Staged},
    },
    error::Error,
    model::{
        Entity, RecordId, Reference,
        film::person::{Actor, Director},
    },
    types::{DecodeError, Record, Value, decode},
};
use chrono::NaiveDate;
use petaldb_base::{
    ConstraintViolation, Enumeration,
    validator::{Validator, text::NonEmpty},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Movie segmentation; persisted as the 1-based index and frozen once set.
pub static MOVIE_CATEGORIES: Enumeration = Enumeration::new(&["TvSeries", "Biography"]);

pub const TV_SERIES: u32 = 1;
pub const BIOGRAPHY: u32 = 2;

pub mod fields {
    pub const MOVIE_ID: &str = "movie_id";
    pub const TITLE: &str = "title";
    pub const RELEASE_DATE: &str = "release_date";
    pub const DIRECTOR_REF: &str = "director_ref";
    pub const ACTOR_REFS: &str = "actor_refs";
    pub const CATEGORY: &str = "category";
    pub const SUBJECT_AREA: &str = "subject_area";
    pub const ABOUT: &str = "about";
}

///
/// MovieSlots
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MovieSlots {
    #[serde(default)]
    pub movie_id: String,
    #[serde(default)]
    pub title: String,
    /// ISO calendar date, `YYYY-MM-DD`.
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub director_ref: String,
    #[serde(default)]
    pub actor_refs: Vec<String>,
    #[serde(default)]
    pub category: Option<u32>,
    #[serde(default)]
    pub subject_area: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

///
/// Movie
///
/// References a single mandatory director and an unordered set of actors.
/// The optional segmentation (`category` with its conditional fields) is
/// frozen once assigned.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    movie_id: RecordId,
    title: String,
    release_date: NaiveDate,
    director_ref: RecordId,
    actor_refs: BTreeSet<RecordId>,
    category: Option<u32>,
    subject_area: Option<String>,
    about: Option<String>,
}

impl Movie {
    pub fn new(slots: MovieSlots) -> Result<Self, ConstraintViolation> {
        let movie_id = RecordId::parse(&slots.movie_id, "movie")?;
        Self::check_title(&slots.title)?;
        let release_date = Self::check_release_date(&slots.release_date)?;
        let director_ref = Self::check_director_ref(&slots.director_ref)?;
        let actor_refs = slots
            .actor_refs
            .iter()
            .map(|raw| RecordId::parse(raw, "actor"))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let category = Self::check_category(slots.category)?;
        Self::check_subject_area(slots.subject_area.as_deref(), category)?;
        Self::check_about(slots.about.as_deref(), category)?;

        Ok(Self {
            movie_id,
            title: slots.title,
            release_date,
            director_ref,
            actor_refs,
            category,
            subject_area: slots.subject_area,
            about: slots.about,
        })
    }

    pub fn check_title(title: &str) -> Result<(), ConstraintViolation> {
        if title.is_empty() {
            return Err(ConstraintViolation::mandatory("a title must be provided"));
        }

        NonEmpty::new("title").validate(title)
    }

    pub fn check_release_date(raw: &str) -> Result<NaiveDate, ConstraintViolation> {
        if raw.is_empty() {
            return Err(ConstraintViolation::mandatory(
                "a release date must be provided",
            ));
        }

        raw.parse().map_err(|_| {
            ConstraintViolation::range(format!(
                "the release date must be a calendar date (YYYY-MM-DD), got '{raw}'"
            ))
        })
    }

    pub fn check_director_ref(raw: &str) -> Result<RecordId, ConstraintViolation> {
        if raw.is_empty() {
            return Err(ConstraintViolation::mandatory(
                "a movie must have a director",
            ));
        }

        RecordId::parse(raw, "director")
    }

    pub fn check_category(category: Option<u32>) -> Result<Option<u32>, ConstraintViolation> {
        match category {
            None => Ok(None),
            Some(c) => {
                MOVIE_CATEGORIES.check(c, "category")?;

                Ok(Some(c))
            }
        }
    }

    pub fn check_subject_area(
        subject_area: Option<&str>,
        category: Option<u32>,
    ) -> Result<(), ConstraintViolation> {
        match (subject_area, category) {
            (None, Some(TV_SERIES)) => Err(ConstraintViolation::mandatory(
                "a subject area must be provided for a TV series",
            )),
            (Some(_), c) if c != Some(TV_SERIES) => Err(ConstraintViolation::generic(
                "a subject area must not be provided unless the movie is a TV series",
            )),
            (Some(sa), _) => NonEmpty::new("subject area").validate(sa),
            _ => Ok(()),
        }
    }

    pub fn check_about(
        about: Option<&str>,
        category: Option<u32>,
    ) -> Result<(), ConstraintViolation> {
        match (about, category) {
            (None, Some(BIOGRAPHY)) => Err(ConstraintViolation::mandatory(
                "a biography movie must have an 'about' subject",
            )),
            (Some(_), c) if c != Some(BIOGRAPHY) => Err(ConstraintViolation::generic(
                "an 'about' subject must not be provided unless the movie is a biography",
            )),
            (Some(about), _) => NonEmpty::new("'about' subject").validate(about),
            _ => Ok(()),
        }
    }

    /// Add an actor reference. Returns whether the set changed.
    pub fn add_actor(&mut self, id: RecordId) -> bool {
        self.actor_refs.insert(id)
    }

    /// Remove an actor reference by equality. Returns whether it was present.
    pub fn remove_actor(&mut self, id: &str) -> bool {
        let before = self.actor_refs.len();
        self.actor_refs.retain(|actor| actor.as_str() != id);

        self.actor_refs.len() != before
    }

    fn actor_refs_value(&self) -> Value {
        Value::List(
            self.actor_refs
                .iter()
                .map(|id| Value::from(id.as_str()))
                .collect(),
        )
    }

    // The patch fields an actor-set repair touches.
    pub(crate) fn actor_refs_fields(&self) -> Record {
        Record::from([(fields::ACTOR_REFS.to_owned(), self.actor_refs_value())])
    }

    #[must_use]
    pub const fn movie_id(&self) -> &RecordId {
        &self.movie_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    #[must_use]
    pub const fn director_ref(&self) -> &RecordId {
        &self.director_ref
    }

    #[must_use]
    pub const fn actor_refs(&self) -> &BTreeSet<RecordId> {
        &self.actor_refs
    }

    #[must_use]
    pub const fn category(&self) -> Option<u32> {
        self.category
    }

    #[must_use]
    pub fn subject_area(&self) -> Option<&str> {
        self.subject_area.as_deref()
    }

    #[must_use]
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }
}

impl Entity for Movie {
    const COLLECTION: &'static str = "movies";
    const ITEM: &'static str = "movie";
    const ORDER_FIELD: &'static str = fields::MOVIE_ID;

    fn key(&self) -> String {
        self.movie_id.to_string()
    }

    fn describe(&self) -> String {
        format!("{} (ID: {})", self.title, self.movie_id)
    }

    fn to_record(&self) -> Record {
        let mut rec = Record::from([
            (
                fields::MOVIE_ID.to_owned(),
                Value::from(self.movie_id.as_str()),
            ),
            (fields::TITLE.to_owned(), Value::from(self.title.as_str())),
            (
                fields::RELEASE_DATE.to_owned(),
                Value::from_date(self.release_date),
            ),
            (
                fields::DIRECTOR_REF.to_owned(),
                Value::from(self.director_ref.as_str()),
            ),
            (fields::ACTOR_REFS.to_owned(), self.actor_refs_value()),
        ]);
        if let Some(category) = self.category {
            rec.insert(fields::CATEGORY.to_owned(), Value::from(category));
        }
        if let Some(subject_area) = &self.subject_area {
            rec.insert(
                fields::SUBJECT_AREA.to_owned(),
                Value::from(subject_area.as_str()),
            );
        }
        if let Some(about) = &self.about {
            rec.insert(fields::ABOUT.to_owned(), Value::from(about.as_str()));
        }

        rec
    }

    fn from_record(rec: &Record) -> Result<Self, DecodeError> {
        let actor_refs = decode::list_field(rec, fields::ACTOR_REFS)?
            .iter()
            .map(|value| {
                value
                    .as_text()
                    .map(|s| RecordId::trusted(s.to_owned()))
                    .ok_or_else(|| {
                        DecodeError::new(fields::ACTOR_REFS, "entry must be an actor ID")
                    })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            movie_id: RecordId::trusted(decode::text_field(rec, fields::MOVIE_ID)?),
            title: decode::text_field(rec, fields::TITLE)?,
            release_date: decode::date_field(rec, fields::RELEASE_DATE)?,
            director_ref: RecordId::trusted(decode::text_field(rec, fields::DIRECTOR_REF)?),
            actor_refs,
            category: decode::opt_nat_field(rec, fields::CATEGORY)?,
            subject_area: decode::opt_text_field(rec, fields::SUBJECT_AREA)?,
            about: decode::opt_text_field(rec, fields::ABOUT)?,
        })
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![Reference::new(
            Director::COLLECTION,
            Director::ITEM,
            self.director_ref.to_string(),
        )];
        refs.extend(self.actor_refs.iter().map(|id| {
            Reference::new(Actor::COLLECTION, Actor::ITEM, id.to_string())
        }));

        refs
    }
}

///
/// MoviePatch
///
/// Field updates plus actor-membership operations. Added actors are
/// reference-checked; removed actors are matched by equality. The category
/// is frozen once assigned.
///

#[derive(Clone, Debug, Default)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub director_ref: Option<String>,
    pub actors_to_add: Vec<String>,
    pub actors_to_remove: Vec<String>,
    pub category: Option<u32>,
    pub subject_area: Option<String>,
    pub about: Option<String>,
}

impl Mutable for Movie {
    type Patch = MoviePatch;

    fn stage(db: &Db<'_>, current: &Self, patch: &Self::Patch) -> Result<Staged<Self>, Error> {
        let mut staged = Staged::new(current.clone());

        if let Some(title) = &patch.title {
            if *title != current.title {
                Self::check_title(title)?;
                staged.after.title.clone_from(title);
                staged.set(fields::TITLE, Value::from(title.as_str()));
            }
        }
        if let Some(date) = patch.release_date {
            if date != current.release_date {
                staged.after.release_date = date;
                staged.set(fields::RELEASE_DATE, Value::from_date(date));
            }
        }
        if let Some(raw) = &patch.director_ref {
            let director_ref = Self::check_director_ref(raw)?;
            if director_ref != current.director_ref {
                if db
                    .store()
                    .get(Director::COLLECTION, director_ref.as_str())?
                    .is_none()
                {
                    return Err(ConstraintViolation::referential_integrity(format!(
                        "there is no director record with ID {director_ref}"
                    ))
                    .into());
                }
                staged.set(fields::DIRECTOR_REF, Value::from(director_ref.as_str()));
                staged.after.director_ref = director_ref;
            }
        }
        if let Some(category) = patch.category {
            match current.category {
                Some(existing) if existing != category => {
                    return Err(
                        ConstraintViolation::frozen("the category cannot be changed").into(),
                    );
                }
                Some(_) => {}
                None => {
                    Self::check_category(Some(category))?;
                    staged.after.category = Some(category);
                    staged.set(fields::CATEGORY, Value::from(category));
                }
            }
        }
        if let Some(subject_area) = &patch.subject_area {
            if Some(subject_area.as_str()) != current.subject_area() {
                Self::check_subject_area(Some(subject_area.as_str()), staged.after.category)?;
                staged.after.subject_area = Some(subject_area.clone());
                staged.set(fields::SUBJECT_AREA, Value::from(subject_area.as_str()));
            }
        }
        if let Some(about) = &patch.about {
            if Some(about.as_str()) != current.about() {
                Self::check_about(Some(about.as_str()), staged.after.category)?;
                staged.after.about = Some(about.clone());
                staged.set(fields::ABOUT, Value::from(about.as_str()));
            }
        }

        let mut membership_changed = false;
        for raw in &patch.actors_to_add {
            let id = RecordId::parse(raw, "actor")?;
            if db.store().get(Actor::COLLECTION, id.as_str())?.is_none() {
                return Err(ConstraintViolation::referential_integrity(format!(
                    "there is no actor record with ID {id}"
                ))
                .into());
            }
            if staged.after.add_actor(id) {
                membership_changed = true;
            }
        }
        for raw in &patch.actors_to_remove {
            if staged.after.remove_actor(raw) {
                membership_changed = true;
            }
        }
        if membership_changed {
            let actor_refs = staged.after.actor_refs_value();
            staged.set(fields::ACTOR_REFS, actor_refs);
        }

        Ok(staged)
    }
}

impl Retract for Movie {}

#[cfg(test)]
mod tests {
    use super::{BIOGRAPHY, Movie, MovieSlots, TV_SERIES};
    use crate::model::Entity;
    use petaldb_base::ConstraintViolation;

    fn slots() -> MovieSlots {
        MovieSlots {
            movie_id: "3".into(),
            title: "Lady Bird".into(),
            release_date: "2017-11-03".into(),
            director_ref: "11".into(),
            actor_refs: vec!["21".into(), "22".into()],
            category: None,
            subject_area: None,
            about: None,
        }
    }

    #[test]
    fn construction_checks_identity_and_references() {
        let movie = Movie::new(slots()).unwrap();
        assert_eq!(movie.key(), "3");
        assert_eq!(movie.actor_refs().len(), 2);

        let mut bad = slots();
        bad.director_ref = String::new();
        assert!(matches!(
            Movie::new(bad),
            Err(ConstraintViolation::Mandatory(_))
        ));

        let mut bad = slots();
        bad.actor_refs = vec!["2x".into()];
        assert!(matches!(
            Movie::new(bad),
            Err(ConstraintViolation::Pattern(_))
        ));
    }

    #[test]
    fn segmentation_fields_are_conditional_on_the_category() {
        let mut tv = slots();
        tv.category = Some(TV_SERIES);
        assert!(matches!(
            Movie::new(tv.clone()),
            Err(ConstraintViolation::Mandatory(_))
        ));
        tv.subject_area = Some("coming of age".into());
        assert!(Movie::new(tv).is_ok());

        let mut plain = slots();
        plain.about = Some("someone".into());
        assert!(matches!(
            Movie::new(plain),
            Err(ConstraintViolation::Generic(_))
        ));

        let mut bio = slots();
        bio.category = Some(BIOGRAPHY);
        bio.about = Some("Lady Bird".into());
        assert!(Movie::new(bio).is_ok());
    }

    #[test]
    fn actor_set_is_unordered_and_deduplicated() {
        let mut dup = slots();
        dup.actor_refs = vec!["21".into(), "21".into(), "22".into()];
        let movie = Movie::new(dup).unwrap();
        assert_eq!(movie.actor_refs().len(), 2);

        let reordered = MovieSlots {
            actor_refs: vec!["22".into(), "21".into()],
            ..slots()
        };
        assert_eq!(Movie::new(reordered).unwrap(), Movie::new(slots()).unwrap());
    }

    #[test]
    fn record_round_trip() {
        let movie = Movie::new(slots()).unwrap();
        assert_eq!(Movie::from_record(&movie.to_record()).unwrap(), movie);

        let mut bio = slots();
        bio.category = Some(BIOGRAPHY);
        bio.about = Some("Lady Bird".into());
        let movie = Movie::new(bio).unwrap();
        assert_eq!(Movie::from_record(&movie.to_record()).unwrap(), movie);
    }
}
