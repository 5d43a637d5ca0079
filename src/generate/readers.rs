use crate::generate::pick;
use crate::state::{CredentialRecord, UserRole};
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;

pub const FIRST_NAMES: [&str; 16] = [
    "Jan", "Anna", "Piotr", "Kasia", "Ola", "Marek", "Ewa", "Tomek", "Zosia", "Bartek", "John",
    "Jane", "Alice", "Bob", "Charlie", "Daisy",
];

pub const LAST_NAMES: [&str; 11] = [
    "Kowalski",
    "Nowak",
    "Wiśniewski",
    "Wójcik",
    "Kamiński",
    "Lewandowski",
    "Smith",
    "Johnson",
    "Brown",
    "Taylor",
    "Anderson",
];

pub const MIN_AGE_YEARS: u64 = 18;
pub const MAX_AGE_YEARS: u64 = 65;

/// Body of `POST auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
}

impl RegisterPayload {
    /// Ledger entry for this account with the reader role
    pub fn credentials(&self, note: Option<String>) -> CredentialRecord {
        CredentialRecord {
            username: self.username.clone(),
            password: self.password.clone(),
            role: UserRole::Reader,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            note,
        }
    }
}

/// Deterministic username for the `index`-th reader
pub fn username(prefix: &str, index: usize) -> String {
    format!("{}_{:03}", prefix, index)
}

/// Password meeting the API minimum length of eight characters
pub fn password(index: usize) -> String {
    format!("Reader{:03}!Pass", index)
}

/// Date of birth between 18 and 65 years (plus up to a year) before `today`
pub fn date_of_birth<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let years = rng.random_range(MIN_AGE_YEARS..=MAX_AGE_YEARS);
    let extra_days = rng.random_range(0..=365);
    today
        .checked_sub_days(Days::new(years * 365 + extra_days))
        .unwrap_or(NaiveDate::MIN)
}

/// Registration payload for the `index`-th reader
pub fn reader<R: Rng + ?Sized>(rng: &mut R, prefix: &str, index: usize, today: NaiveDate) -> RegisterPayload {
    let username = username(prefix, index);
    RegisterPayload {
        email: format!("{}@example.com", username),
        password: password(index),
        first_name: pick(rng, &FIRST_NAMES).to_string(),
        last_name: pick(rng, &LAST_NAMES).to_string(),
        date_of_birth: date_of_birth(rng, today),
        username,
    }
}
