use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// Body of `POST rentals`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPayload {
    pub reader_id: i64,
    pub copy_id: i64,
    pub due_date: NaiveDate,
}

/// `today` plus a uniform number of days in `min_days..=max_days`
pub fn due_date<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate, min_days: u32, max_days: u32) -> NaiveDate {
    let days = rng.random_range(min_days..=max_days.max(min_days));
    today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn rental<R: Rng + ?Sized>(
    rng: &mut R,
    reader_id: i64,
    copy_id: i64,
    today: NaiveDate,
    min_days: u32,
    max_days: u32,
) -> RentalPayload {
    RentalPayload {
        reader_id,
        copy_id,
        due_date: due_date(rng, today, min_days, max_days),
    }
}
