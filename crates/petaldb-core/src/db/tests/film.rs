use super::{person_slots, session};
use crate::{
    db::DbSession,
    error::Error,
    model::{
        Entity,
        film::{
            movie::{Movie, MoviePatch, MovieSlots, TV_SERIES, BIOGRAPHY},
            person::{Actor, Director, PersonLike, PersonPatch},
        },
    },
    store::MemoryStore,
};
use petaldb_base::ConstraintViolation;

fn seed_people(session: &DbSession<'_>) {
    session
        .add(Director::new(person_slots(0)).unwrap())
        .unwrap();
    for index in [1, 2] {
        session.add(Actor::new(person_slots(index)).unwrap()).unwrap();
    }
}

fn movie_slots() -> MovieSlots {
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
fn movie_add_checks_both_reference_kinds() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);

    // unknown director
    let mut slots = movie_slots();
    slots.director_ref = "404".into();
    let err = session.add(Movie::new(slots).unwrap()).unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(ConstraintViolation::ReferentialIntegrity(_))
    ));

    // unknown actor in the set
    let mut slots = movie_slots();
    slots.actor_refs.push("404".into());
    let err = session.add(Movie::new(slots).unwrap()).unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(ConstraintViolation::ReferentialIntegrity(_))
    ));
    assert!(store.is_empty(Movie::COLLECTION));

    session.add(Movie::new(movie_slots()).unwrap()).unwrap();
    assert_eq!(store.len(Movie::COLLECTION), 1);
}

#[test]
fn actor_membership_updates_are_checked_and_applied() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);
    let mut slots = movie_slots();
    slots.actor_refs = vec!["21".into()];
    session.add(Movie::new(slots).unwrap()).unwrap();

    let patch = MoviePatch {
        actors_to_add: vec!["22".into()],
        actors_to_remove: vec!["21".into()],
        ..MoviePatch::default()
    };
    session.update::<Movie>("3", &patch).unwrap();

    let movie = session.retrieve::<Movie>("3").unwrap().unwrap();
    let actors: Vec<&str> = movie.actor_refs().iter().map(|id| id.as_str()).collect();
    assert_eq!(actors, vec!["22"]);

    // adding an unknown actor aborts the whole update
    let bad = MoviePatch {
        actors_to_add: vec!["404".into()],
        actors_to_remove: vec!["22".into()],
        ..MoviePatch::default()
    };
    assert!(session.update::<Movie>("3", &bad).is_err());
    let movie = session.retrieve::<Movie>("3").unwrap().unwrap();
    assert_eq!(movie.actor_refs().len(), 1);
}

#[test]
fn director_change_is_reference_checked() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);
    session.add(Movie::new(movie_slots()).unwrap()).unwrap();

    let bad = MoviePatch {
        director_ref: Some("404".into()),
        ..MoviePatch::default()
    };
    let err = session.update::<Movie>("3", &bad).unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(ConstraintViolation::ReferentialIntegrity(_))
    ));
    let movie = session.retrieve::<Movie>("3").unwrap().unwrap();
    assert_eq!(movie.director_ref().as_str(), "11");
}

#[test]
fn category_freezes_once_assigned() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);
    session.add(Movie::new(movie_slots()).unwrap()).unwrap();

    let assign = MoviePatch {
        category: Some(TV_SERIES),
        subject_area: Some("coming of age".into()),
        ..MoviePatch::default()
    };
    session.update::<Movie>("3", &assign).unwrap();

    let movie = session.retrieve::<Movie>("3").unwrap().unwrap();
    assert_eq!(movie.category(), Some(TV_SERIES));
    assert_eq!(movie.subject_area(), Some("coming of age"));

    // same value again is not a change
    let same = MoviePatch {
        category: Some(TV_SERIES),
        ..MoviePatch::default()
    };
    let outcome = session.update::<Movie>("3", &same).unwrap();
    assert!(outcome.is_unchanged());

    // a different value hits the freeze
    let flip = MoviePatch {
        category: Some(BIOGRAPHY),
        ..MoviePatch::default()
    };
    let err = session.update::<Movie>("3", &flip).unwrap_err();
    assert!(matches!(
        err.violation(),
        Some(ConstraintViolation::Frozen(_))
    ));
}

#[test]
fn deleting_an_actor_repairs_every_movie_in_the_same_commit() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);
    session.add(Movie::new(movie_slots()).unwrap()).unwrap();
    let mut second = movie_slots();
    second.movie_id = "4".into();
    second.title = "Brooklyn".into();
    second.actor_refs = vec!["21".into()];
    session.add(Movie::new(second).unwrap()).unwrap();

    session.destroy::<Actor>("21").unwrap();

    assert!(session.retrieve::<Actor>("21").unwrap().is_none());
    for key in ["3", "4"] {
        let movie = session.retrieve::<Movie>(key).unwrap().unwrap();
        assert!(
            !movie.actor_refs().iter().any(|id| id.as_str() == "21"),
            "movie {key} still references the deleted actor"
        );
    }
    // the other actor is untouched
    let movie = session.retrieve::<Movie>("3").unwrap().unwrap();
    assert_eq!(movie.actor_refs().len(), 1);
}

#[test]
fn deleting_a_referenced_director_is_rejected() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);
    session.add(Movie::new(movie_slots()).unwrap()).unwrap();

    let err = session.destroy::<Director>("11").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(session.retrieve::<Director>("11").unwrap().is_some());
    assert!(session.retrieve::<Movie>("3").unwrap().is_some());

    // once the movie is gone, the director can go too
    session.destroy::<Movie>("3").unwrap();
    session.destroy::<Director>("11").unwrap();
    assert!(session.retrieve::<Director>("11").unwrap().is_none());
}

#[test]
fn person_updates_stage_only_real_changes() {
    let store = MemoryStore::new();
    let session = session(&store);
    seed_people(&session);

    let same = PersonPatch {
        name: Some("Saoirse Ronan".into()),
        ..PersonPatch::default()
    };
    let outcome = session.update::<Actor>("21", &same).unwrap();
    assert!(outcome.is_unchanged());

    let rename = PersonPatch {
        name: Some("S. Ronan".into()),
        biography: Some("Four-time nominee".into()),
        ..PersonPatch::default()
    };
    session.update::<Actor>("21", &rename).unwrap();
    let actor = session.retrieve::<Actor>("21").unwrap().unwrap();
    assert_eq!(actor.name(), "S. Ronan");
    assert_eq!(actor.card().biography(), Some("Four-time nominee"));
}
