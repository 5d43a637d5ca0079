use crate::client::endpoints;
use crate::generate::authors::author;
use crate::generate::SeedRng;
use crate::stages::StageContext;
use crate::state::{PipelineState, Stage};
use crate::SeedError;

/// Creates `seed.authors` authors
///
/// Writes `author_ids`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let count = ctx.seed.authors;
    let ids = state.author_ids.insert(Vec::with_capacity(count));

    for _ in 0..count {
        let payload = author(rng);
        let id = ctx.create(Stage::Authors, "author", endpoints::AUTHORS, &payload).await?;
        tracing::debug!("Created author {} ({})", id, payload.first_name);
        ids.push(id);
    }

    tracing::info!("Created {} authors", ids.len());
    Ok(())
}
