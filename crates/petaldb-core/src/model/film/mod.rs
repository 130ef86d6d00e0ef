pub mod movie;
pub mod person;

pub use movie::{MOVIE_CATEGORIES, Movie, MoviePatch, MovieSlots};
pub use person::{Actor, Director, PersonCard, PersonLike, PersonPatch, PersonSlots};
