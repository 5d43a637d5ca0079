//! Edition payloads and ISBN-13 synthesis
//!
//! Generated ISBNs use the `978` prefix, nine random digits and a correct
//! check digit. They are not tied to real registrant ranges.

use crate::generate::pick;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

pub const LANGUAGES: [&str; 5] = ["en", "pl", "de", "fr", "es"];

pub const MIN_PAGE_COUNT: u32 = 80;
pub const MAX_PAGE_COUNT: u32 = 900;
pub const MIN_PUBLICATION_YEAR: i32 = 1950;

/// Attempts before giving up on finding an unused ISBN
pub const ISBN_ATTEMPTS: usize = 10;

/// Body of `POST book-editions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionPayload {
    pub book_id: i64,
    pub isbn: String,
    pub page_count: u32,
    pub publication_year: i32,
    pub publisher_id: i64,
    pub language: String,
}

/// ISBN-13 check digit for the first twelve digits
///
/// Digits at even positions weigh 1, odd positions weigh 3; the check digit
/// brings the weighted sum to a multiple of ten.
pub fn isbn13_check_digit(digits: &[u8; 12]) -> u8 {
    let total: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| u32::from(*d) * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - (total % 10)) % 10) as u8
}

/// Random valid ISBN-13, formatted `978-d-ddddd-ddd-c`
pub fn make_isbn13<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = [0u8; 12];
    digits[..3].copy_from_slice(&[9, 7, 8]);
    for d in digits[3..].iter_mut() {
        *d = rng.random_range(0..10);
    }
    let check = isbn13_check_digit(&digits);

    let s: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    format!("{}-{}-{}-{}-{}", &s[0..3], &s[3..4], &s[4..9], &s[9..12], check)
}

/// Checks that a (possibly hyphenated) ISBN-13 has a correct check digit
pub fn is_valid_isbn13(isbn: &str) -> bool {
    let digits: Vec<u8> = isbn
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect::<Option<_>>()
        .unwrap_or_default();

    if digits.len() != 13 {
        return false;
    }

    let mut prefix = [0u8; 12];
    prefix.copy_from_slice(&digits[..12]);
    isbn13_check_digit(&prefix) == digits[12]
}

/// ISBNs handed out during one run
#[derive(Debug, Default)]
pub struct IsbnRegistry {
    used: HashSet<String>,
}

impl IsbnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws ISBNs until one is unused, at most `attempts` times
    pub fn next_unique<R: Rng + ?Sized>(&mut self, rng: &mut R, attempts: usize) -> Option<String> {
        for _ in 0..attempts {
            let isbn = make_isbn13(rng);
            if self.used.insert(isbn.clone()) {
                return Some(isbn);
            }
        }
        None
    }

    /// Marks `isbn` as taken
    pub fn reserve(&mut self, isbn: impl Into<String>) -> bool {
        self.used.insert(isbn.into())
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// Builds an edition of `book_id` from one of `publisher_ids` (must be non-empty)
pub fn edition<R: Rng + ?Sized>(
    rng: &mut R,
    book_id: i64,
    isbn: String,
    publisher_ids: &[i64],
    current_year: i32,
) -> EditionPayload {
    EditionPayload {
        book_id,
        isbn,
        page_count: rng.random_range(MIN_PAGE_COUNT..=MAX_PAGE_COUNT),
        publication_year: rng.random_range(MIN_PUBLICATION_YEAR..=current_year.max(MIN_PUBLICATION_YEAR)),
        publisher_id: publisher_ids[rng.random_range(0..publisher_ids.len())],
        language: pick(rng, &LANGUAGES).to_string(),
    }
}
