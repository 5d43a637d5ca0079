use crate::client::endpoints;
use crate::generate::editions::{edition, IsbnRegistry, ISBN_ATTEMPTS};
use crate::generate::SeedRng;
use crate::stages::StageContext;
use crate::state::{require, PipelineState, Stage, StateKey};
use crate::SeedError;
use chrono::Datelike;

/// Creates `seed.editions_per_book` editions for every book
///
/// ISBNs are unique within the run; uniqueness is enforced before the call.
///
/// Requires `book_ids` and `publisher_ids`.
/// Writes `book_edition_ids` and `book_id_to_edition_ids`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let book_ids = require(&state.book_ids, StateKey::BookIds, Stage::Editions)?.to_vec();
    let publisher_ids = require(&state.publisher_ids, StateKey::PublisherIds, Stage::Editions)?.to_vec();

    let per_book = ctx.seed.effective_editions_per_book();
    let current_year = ctx.today.year();
    let mut isbns = IsbnRegistry::new();

    state.book_edition_ids = Some(Vec::with_capacity(book_ids.len() * per_book));
    state.book_id_to_edition_ids = Some(Default::default());

    for book_id in book_ids {
        for _ in 0..per_book {
            let isbn = isbns
                .next_unique(rng, ISBN_ATTEMPTS)
                .ok_or(SeedError::IsbnExhausted {
                    book_id,
                    attempts: ISBN_ATTEMPTS,
                })?;

            let payload = edition(rng, book_id, isbn, &publisher_ids, current_year);
            let id = ctx
                .create(Stage::Editions, "bookEdition", endpoints::BOOK_EDITIONS, &payload)
                .await?;
            tracing::debug!("Created edition {} of book {} (ISBN {})", id, book_id, payload.isbn);

            if let Some(ids) = state.book_edition_ids.as_mut() {
                ids.push(id);
            }
            if let Some(groups) = state.book_id_to_edition_ids.as_mut() {
                groups.entry(book_id).or_default().push(id);
            }
        }
    }

    tracing::info!(
        "Created {} editions",
        state.book_edition_ids.as_ref().map_or(0, Vec::len)
    );
    Ok(())
}
