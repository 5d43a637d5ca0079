use rand::Rng;
use serde::Serialize;

/// Ratings the review endpoint accepts
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Chance that a review carries text
pub const TEXT_PROBABILITY: f64 = 0.8;

/// Fixed text for each rating
pub fn rating_text(rating: u8) -> &'static str {
    match rating {
        1 => "Terrible, would not recommend.",
        2 => "Disappointing overall.",
        3 => "Fair, some good and some bad.",
        4 => "Very good, strong recommendation.",
        _ => "Perfect, an all time favorite.",
    }
}

/// Body of `POST books/{bookId}/reviews`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub reader_id: i64,
    pub rating: u8,
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_edition_id: Option<i64>,
}

pub fn review<R: Rng + ?Sized>(rng: &mut R, reader_id: i64, book_edition_id: Option<i64>) -> ReviewPayload {
    let rating = rng.random_range(MIN_RATING..=MAX_RATING);
    let text = rng
        .random_bool(TEXT_PROBABILITY)
        .then(|| rating_text(rating).to_string());

    ReviewPayload {
        reader_id,
        rating,
        text,
        book_edition_id,
    }
}
