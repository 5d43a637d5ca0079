use crate::generate::pick;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

pub const GENRES: [&str; 32] = [
    "FICTION",
    "FANTASY",
    "SCIENCE_FICTION",
    "DYSTOPIAN",
    "ACTION_AND_ADVENTURE",
    "MYSTERY",
    "HORROR",
    "THRILLER",
    "HISTORICAL_FICTION",
    "ROMANCE",
    "CONTEMPORARY_FICTION",
    "LITERARY_FICTION",
    "GRAPHIC_NOVEL",
    "SHORT_STORY",
    "NON_FICTION",
    "MEMOIR",
    "BIOGRAPHY",
    "AUTOBIOGRAPHY",
    "HISTORY",
    "TRAVEL",
    "TRUE_CRIME",
    "HUMOR",
    "ESSAYS",
    "GUIDE_HOW_TO",
    "RELIGION_AND_SPIRITUALITY",
    "HUMANITIES",
    "SCIENCE_AND_TECHNOLOGY",
    "PARENTING",
    "SELF_HELP",
    "COOKBOOK",
    "ART_AND_PHOTOGRAPHY",
    "POETRY",
];

pub const AGE_RATINGS: [&str; 5] = ["EVERYONE", "TODDLER", "CHILDREN", "TEENAGER", "ADULT"];

/// Chance that a book carries an age rating
pub const AGE_RATING_PROBABILITY: f64 = 0.7;

/// Genre counts drawn uniformly, so one or two genres are twice as likely as three
const GENRE_COUNT_WEIGHTS: [usize; 5] = [1, 1, 2, 2, 3];

const AUTHOR_COUNTS: [usize; 3] = [1, 2, 3];

const ADJECTIVES: [&str; 15] = [
    "Silent", "Lost", "Hidden", "Burning", "Broken", "Ancient", "Neon", "Golden", "Midnight",
    "Wandering", "Forgotten", "Electric", "Crimson", "Winter", "Glass",
];

const NOUNS: [&str; 15] = [
    "City", "Empire", "Forest", "Ocean", "Machine", "Library", "Signal", "Garden", "Voyage",
    "Chronicle", "Dune", "Shadow", "Tower", "Protocol", "Cathedral",
];

const CONNECTORS: [&str; 6] = ["of the", "and the", "under the", "beyond the", "within the", "from the"];

/// Body of `POST books`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    pub genres: Vec<String>,
    pub age_rating: Option<String>,
    pub author_ids: Vec<i64>,
}

/// One of three title patterns: "Adj Noun", "The Adj Noun", "Adj Noun connector Noun"
pub fn title<R: Rng + ?Sized>(rng: &mut R) -> String {
    match rng.random_range(0..3) {
        0 => format!("{} {}", pick(rng, &ADJECTIVES), pick(rng, &NOUNS)),
        1 => format!("The {} {}", pick(rng, &ADJECTIVES), pick(rng, &NOUNS)),
        _ => format!(
            "{} {} {} {}",
            pick(rng, &ADJECTIVES),
            pick(rng, &NOUNS),
            pick(rng, &CONNECTORS),
            pick(rng, &NOUNS)
        ),
    }
}

/// Builds a book linked to up to three of `author_ids` (none when empty)
pub fn book<R: Rng + ?Sized>(rng: &mut R, author_ids: &[i64]) -> BookPayload {
    let title = title(rng);

    let genre_count = *GENRE_COUNT_WEIGHTS.choose(rng).unwrap_or(&1);
    let genres = GENRES
        .choose_multiple(rng, genre_count)
        .map(|g| g.to_string())
        .collect();

    let age_rating = if rng.random_bool(AGE_RATING_PROBABILITY) {
        Some(pick(rng, &AGE_RATINGS).to_string())
    } else {
        None
    };

    let author_ids = if author_ids.is_empty() {
        Vec::new()
    } else {
        let wanted = *AUTHOR_COUNTS.choose(rng).unwrap_or(&1);
        author_ids
            .choose_multiple(rng, wanted.min(author_ids.len()))
            .copied()
            .collect()
    };

    BookPayload {
        title,
        genres,
        age_rating,
        author_ids,
    }
}
