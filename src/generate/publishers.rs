use crate::generate::pick;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

pub const PUBLISHER_NAMES: [&str; 14] = [
    "Penguin Random House",
    "HarperCollins",
    "Simon & Schuster",
    "Hachette Livre",
    "Macmillan Publishers",
    "Oxford University Press",
    "Cambridge University Press",
    "Tor Books",
    "Gollancz",
    "Albatros",
    "Prószyński i S-ka",
    "Znak",
    "Czarne",
    "Wydawnictwo Literackie",
];

/// Count used when none is configured
pub fn default_publisher_count() -> usize {
    PUBLISHER_NAMES.len().min(10)
}

/// Body of `POST publishers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublisherPayload {
    pub name: String,
}

/// `count` publisher names: the shuffled vocabulary first, then
/// vocabulary names with a random four-digit suffix
pub fn publisher_names<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    let mut pool: Vec<&str> = PUBLISHER_NAMES.to_vec();
    pool.shuffle(rng);

    (0..count)
        .map(|i| match pool.get(i) {
            Some(name) => name.to_string(),
            None => format!("{} {}", pick(rng, &PUBLISHER_NAMES), rng.random_range(1000..=9999)),
        })
        .collect()
}
