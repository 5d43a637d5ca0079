use crate::client::endpoints;
use crate::generate::copies::copy;
use crate::stages::StageContext;
use crate::state::{require, PipelineState, Stage, StateKey};
use crate::SeedError;

/// Creates `seed.copies-per-edition` available copies of every edition
///
/// Requires `book_edition_ids`.
/// Writes `book_copy_ids` and `book_copy_ids_by_edition`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState) -> Result<(), SeedError> {
    let edition_ids = require(&state.book_edition_ids, StateKey::BookEditionIds, Stage::Copies)?.to_vec();
    let per_edition = ctx.seed.effective_copies_per_edition();

    state.book_copy_ids = Some(Vec::with_capacity(edition_ids.len() * per_edition));
    state.book_copy_ids_by_edition = Some(Default::default());

    for edition_id in edition_ids {
        for _ in 0..per_edition {
            let payload = copy(edition_id);
            let id = ctx
                .create(Stage::Copies, "bookCopy", endpoints::BOOK_COPIES, &payload)
                .await?;

            if let Some(ids) = state.book_copy_ids.as_mut() {
                ids.push(id);
            }
            if let Some(groups) = state.book_copy_ids_by_edition.as_mut() {
                groups.entry(edition_id).or_default().push(id);
            }
        }
    }

    tracing::info!(
        "Created {} copies",
        state.book_copy_ids.as_ref().map_or(0, Vec::len)
    );
    Ok(())
}
