use crate::generate::pick;
use rand::Rng;
use serde::Serialize;

pub const FIRST_NAMES: [&str; 15] = [
    "George", "Frank", "Ursula", "Philip", "Isaac", "Mary", "Agatha", "Stephen", "Andrzej",
    "Olga", "Stanisław", "J.R.R.", "F.", "Haruki", "Terry",
];

pub const MIDDLE_NAMES: [&str; 6] = ["Raymond", "Scott", "Roger", "Howard", "Anne", "Marie"];

pub const LAST_NAMES: [&str; 14] = [
    "Martin", "Fitzgerald", "Le Guin", "Dick", "Asimov", "Shelley", "Christie", "King",
    "Sapkowski", "Tokarczuk", "Lem", "Tolkien", "Murakami", "Pratchett",
];

/// Chance that an author has no middle name
pub const NO_MIDDLE_NAME_PROBABILITY: f64 = 1.0 / 3.0;

/// Chance that an author is known by a single name (pseudonym)
pub const NO_LAST_NAME_PROBABILITY: f64 = 0.1;

/// Body of `POST authors`
///
/// Missing optional names are sent as explicit `null`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
}

pub fn author<R: Rng + ?Sized>(rng: &mut R) -> AuthorPayload {
    let first_name = pick(rng, &FIRST_NAMES).to_string();
    let middle_name = if rng.random_bool(NO_MIDDLE_NAME_PROBABILITY) {
        None
    } else {
        Some(pick(rng, &MIDDLE_NAMES).to_string())
    };
    let last_name = if rng.random_bool(NO_LAST_NAME_PROBABILITY) {
        None
    } else {
        Some(pick(rng, &LAST_NAMES).to_string())
    };

    AuthorPayload {
        first_name,
        middle_name,
        last_name,
    }
}
