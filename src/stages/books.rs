use crate::client::endpoints;
use crate::generate::books::book;
use crate::generate::SeedRng;
use crate::stages::StageContext;
use crate::state::{PipelineState, Stage};
use crate::SeedError;

/// Creates `seed.books` books linked to previously created authors
///
/// `author_ids` is optional: without it books are created with no authors.
///
/// Writes `book_ids`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let count = ctx.seed.books;
    let author_ids = state.author_ids.clone().unwrap_or_default();
    if author_ids.is_empty() && count > 0 {
        tracing::warn!("No author_ids in state; books will be created without authors");
    }

    let ids = state.book_ids.insert(Vec::with_capacity(count));

    for _ in 0..count {
        let payload = book(rng, &author_ids);
        let id = ctx.create(Stage::Books, "book", endpoints::BOOKS, &payload).await?;
        tracing::debug!("Created book {} '{}'", id, payload.title);
        ids.push(id);
    }

    tracing::info!("Created {} books", ids.len());
    Ok(())
}
