use crate::client::endpoints;
use crate::generate::rentals::rental;
use crate::generate::SeedRng;
use crate::stages::{resolve_reader_ids, StageContext};
use crate::state::{require, PipelineState, Stage, StateKey};
use crate::SeedError;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

/// Copies on the shelf versus copies out on loan
///
/// Every copy is in exactly one of the two lists: they never overlap and
/// together they always hold the full copy set the pool was built from.
#[derive(Debug, Clone, Default)]
pub struct CopyPool {
    available: Vec<i64>,
    rented: Vec<i64>,
}

impl CopyPool {
    /// Splits `all` into available and rented copies
    ///
    /// Duplicates in `all` are dropped; `already_rented` entries outside
    /// `all` are ignored.
    pub fn new(all: &[i64], already_rented: &[i64]) -> Self {
        let on_loan: HashSet<i64> = already_rented.iter().copied().collect();
        let mut seen = HashSet::with_capacity(all.len());
        let mut pool = Self::default();

        for &copy_id in all {
            if !seen.insert(copy_id) {
                continue;
            }
            if on_loan.contains(&copy_id) {
                pool.rented.push(copy_id);
            } else {
                pool.available.push(copy_id);
            }
        }
        pool
    }

    /// Moves a uniformly chosen available copy to the rented list
    pub fn take_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<i64> {
        if self.available.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.available.len());
        let copy_id = self.available.swap_remove(index);
        self.rented.push(copy_id);
        Some(copy_id)
    }

    /// Puts a rented copy back on the shelf; false if it was not rented
    pub fn release(&mut self, copy_id: i64) -> bool {
        match self.rented.iter().position(|id| *id == copy_id) {
            Some(index) => {
                self.rented.remove(index);
                self.available.push(copy_id);
                true
            }
            None => false,
        }
    }

    pub fn available(&self) -> &[i64] {
        &self.available
    }

    pub fn rented(&self) -> &[i64] {
        &self.rented
    }

    pub fn is_exhausted(&self) -> bool {
        self.available.is_empty()
    }

    pub fn len(&self) -> usize {
        self.available.len() + self.rented.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates up to `seed.rentals` rentals and returns a share of them
///
/// Copy and reader are drawn uniformly. A returned rental puts its copy back
/// into the pool at once. The loop stops early, without error, when no copy
/// is left on the shelf.
///
/// Requires `book_copy_ids` and readers (see [`resolve_reader_ids`]).
/// Writes `rental_ids`, `returned_rental_ids` and `rented_copy_ids`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let copy_ids = require(&state.book_copy_ids, StateKey::BookCopyIds, Stage::Rentals)?.to_vec();
    let reader_ids = resolve_reader_ids(ctx, state, Stage::Rentals, true).await?;

    let mut pool = CopyPool::new(&copy_ids, state.rented_copy_ids.as_deref().unwrap_or_default());
    let return_probability = (ctx.seed.rentals_returned_pct / 100.0).clamp(0.0, 1.0);

    let rental_ids = state.rental_ids.insert(Vec::with_capacity(ctx.seed.rentals));
    let returned_ids = state.returned_rental_ids.insert(Vec::new());
    state.rented_copy_ids = Some(pool.rented().to_vec());

    for _ in 0..ctx.seed.rentals {
        let Some(copy_id) = pool.take_random(rng) else {
            tracing::info!("No available copies left after {} rentals", rental_ids.len());
            break;
        };
        let Some(&reader_id) = reader_ids.choose(rng) else {
            break;
        };

        let payload = rental(
            rng,
            reader_id,
            copy_id,
            ctx.today,
            ctx.seed.due_days_min,
            ctx.seed.due_days_max,
        );
        let id = ctx.create(Stage::Rentals, "rental", endpoints::RENTALS, &payload).await?;
        rental_ids.push(id);
        state.rented_copy_ids = Some(pool.rented().to_vec());
        tracing::debug!("Rental {}: copy {} to reader {} due {}", id, copy_id, reader_id, payload.due_date);

        if rng.random_bool(return_probability) {
            ctx.client.post(&endpoints::rental_return(id), None).await?;
            returned_ids.push(id);
            pool.release(copy_id);
            state.rented_copy_ids = Some(pool.rented().to_vec());
            tracing::debug!("Returned rental {}", id);
        }
    }

    tracing::info!(
        "Created {} rentals ({} returned, {} copies still on loan)",
        rental_ids.len(),
        returned_ids.len(),
        pool.rented().len()
    );
    Ok(())
}
