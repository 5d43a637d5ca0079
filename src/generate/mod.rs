//! Payload generators for every entity kind
//!
//! Generators are pure functions of static vocabularies, their arguments and
//! an explicit random source. Passing a seeded [`SeedRng`] makes every payload
//! sequence reproducible.

pub mod authors;
pub mod books;
pub mod copies;
pub mod editions;
pub mod publishers;
pub mod readers;
pub mod rentals;
pub mod reviews;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use authors::AuthorPayload;
pub use books::BookPayload;
pub use copies::{CopyPayload, CopyStatus};
pub use editions::{isbn13_check_digit, make_isbn13, EditionPayload, IsbnRegistry};
pub use readers::RegisterPayload;
pub use rentals::RentalPayload;
pub use reviews::ReviewPayload;

/// Random source used by the whole pipeline
pub type SeedRng = ChaCha8Rng;

/// Seeded source when `seed` is set, otherwise one seeded from entropy
pub fn seeded_rng(seed: Option<u64>) -> SeedRng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::seed_from_u64(rand::random()),
    }
}

/// Uniform pick from a non-empty static vocabulary
pub(crate) fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}
