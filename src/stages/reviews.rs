use crate::client::endpoints;
use crate::extract::{first_id_in, IdExtractor, ListExtractor};
use crate::generate::reviews::review;
use crate::generate::SeedRng;
use crate::stages::{resolve_reader_ids, StageContext, REVIEW_SKIP_STATUSES};
use crate::state::{PipelineState, Stage, StateKey};
use crate::SeedError;
use rand::seq::{IndexedRandom, SliceRandom};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A reader who may review one book, optionally a specific edition of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCandidate {
    pub reader_id: i64,
    pub book_id: i64,
    pub edition_id: Option<i64>,
}

impl ReviewCandidate {
    /// What the API treats as "already reviewed": the edition when known
    pub fn dedup_key(&self) -> (i64, i64) {
        (self.reader_id, self.edition_id.unwrap_or(self.book_id))
    }

    /// Builds a candidate from a rental as the API returns it
    fn from_rental(rental: &Map<String, Value>, state: &PipelineState) -> Option<Self> {
        let reader_id = first_id_in(rental, &["readerId", "reader_id"])?;
        let edition_id = first_id_in(rental, &["editionId", "bookEditionId", "edition_id", "book_edition_id"])
            .or_else(|| first_id_in(rental, &["copyId", "copy_id"]).and_then(|c| state.edition_for_copy(c)));
        let book_id = first_id_in(rental, &["bookId", "book_id"])
            .or_else(|| edition_id.and_then(|e| state.book_for_edition(e)))?;

        Some(Self {
            reader_id,
            book_id,
            edition_id,
        })
    }
}

/// Posts reviews for books readers have actually rented and returned
///
/// Candidates come from `returned_rental_ids` when present, otherwise from
/// the listing of inactive rentals, otherwise from pairing resolved readers
/// with `book_ids`. A (reader, edition-or-book) pair is submitted at most
/// once per run. Reviews are best-effort: a 400/409/422 skips the item.
///
/// Writes `review_ids` and `reviews_created`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let mut candidates = candidates(ctx, state, rng).await?;
    if candidates.is_empty() {
        return Err(SeedError::MissingPrecondition {
            stage: Stage::Reviews,
            key: StateKey::ReturnedRentalIds,
            producer: StateKey::ReturnedRentalIds.producer(),
        });
    }

    candidates.shuffle(rng);
    let selected = unique_candidates(candidates, ctx.seed.reviews);
    let ids_from = IdExtractor::for_entity("review", ctx.id_scope);

    let review_ids = state.review_ids.insert(Vec::new());
    let created = state.reviews_created.insert(0);
    let mut skipped = 0;

    for candidate in selected {
        let payload = review(rng, candidate.reader_id, candidate.edition_id);
        let body = serde_json::to_value(&payload)?;

        match ctx.client.post(&endpoints::book_reviews(candidate.book_id), Some(&body)).await {
            Ok(response) => {
                *created += 1;
                if let Some(id) = ids_from.extract(response.json_or_null()) {
                    review_ids.push(id);
                }
            }
            Err(e) if e.is_status_in(&REVIEW_SKIP_STATUSES) => {
                skipped += 1;
                tracing::debug!("Review by reader {} skipped: {}", candidate.reader_id, e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("Created {} reviews ({} skipped)", created, skipped);
    Ok(())
}

/// Drops repeated (reader, target) pairs, then keeps at most `limit` candidates
fn unique_candidates(candidates: Vec<ReviewCandidate>, limit: Option<usize>) -> Vec<ReviewCandidate> {
    let total = candidates.len();
    let mut seen = HashSet::new();
    let unique: Vec<ReviewCandidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedup_key()))
        .collect();
    if unique.len() < total {
        tracing::debug!("Dropped {} repeated review pairs", total - unique.len());
    }

    let limit = limit.unwrap_or(unique.len());
    unique.into_iter().take(limit).collect()
}

async fn candidates(
    ctx: &StageContext<'_>,
    state: &PipelineState,
    rng: &mut SeedRng,
) -> Result<Vec<ReviewCandidate>, SeedError> {
    let rentals = match state.returned_rental_ids.as_deref() {
        Some(ids) if !ids.is_empty() => fetch_rentals(ctx, ids).await,
        _ => list_inactive_rentals(ctx).await,
    };

    let from_rentals: Vec<ReviewCandidate> = rentals
        .iter()
        .filter_map(|rental| ReviewCandidate::from_rental(rental, state))
        .collect();
    if !from_rentals.is_empty() {
        return Ok(from_rentals);
    }

    let book_ids = match state.book_ids.as_deref() {
        Some(ids) if !ids.is_empty() => ids,
        _ => return Ok(Vec::new()),
    };

    tracing::info!("No returned rentals found, pairing readers with books instead");
    let reader_ids = resolve_reader_ids(ctx, state, Stage::Reviews, true).await?;
    Ok(book_ids
        .iter()
        .filter_map(|&book_id| {
            let reader_id = *reader_ids.choose(rng)?;
            Some(ReviewCandidate {
                reader_id,
                book_id,
                edition_id: None,
            })
        })
        .collect())
}

/// Rentals by identifier; unreadable ones are skipped
async fn fetch_rentals(ctx: &StageContext<'_>, ids: &[i64]) -> Vec<Map<String, Value>> {
    let mut rentals = Vec::with_capacity(ids.len());
    for &id in ids {
        match ctx.client.get(&endpoints::rental(id)).await {
            Ok(response) => {
                if let Some(rental) = response.as_json().and_then(Value::as_object) {
                    rentals.push(rental.clone());
                }
            }
            Err(e) => tracing::warn!("Could not fetch rental {}: {}", id, e),
        }
    }
    rentals
}

async fn list_inactive_rentals(ctx: &StageContext<'_>) -> Vec<Map<String, Value>> {
    match ctx.client.get_with_query(endpoints::RENTALS, &[("active", "false")]).await {
        Ok(response) => ListExtractor::for_collection("rentals")
            .extract(response.json_or_null())
            .into_iter()
            .cloned()
            .collect(),
        Err(e) => {
            tracing::warn!("Could not list inactive rentals: {}", e);
            Vec::new()
        }
    }
}
