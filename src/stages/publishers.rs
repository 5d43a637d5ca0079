use crate::client::endpoints;
use crate::extract::{first_id_in, first_str_in, ListExtractor};
use crate::generate::publishers::{publisher_names, PublisherPayload};
use crate::generate::SeedRng;
use crate::stages::StageContext;
use crate::state::{PipelineState, Stage};
use crate::SeedError;
use std::collections::HashMap;

/// Creates or reuses `seed.publishers` publishers
///
/// Existing publishers are listed first and matched by name, so rerunning
/// the stage against the same deployment does not create duplicates.
///
/// Writes `publisher_ids`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let count = ctx.seed.effective_publishers();

    let mut name_to_id = existing_publishers(ctx).await?;
    tracing::debug!("Found {} existing publishers", name_to_id.len());

    let ids = state.publisher_ids.insert(Vec::with_capacity(count));
    let mut reused = 0;

    for name in publisher_names(rng, count) {
        if let Some(id) = name_to_id.get(&name) {
            ids.push(*id);
            reused += 1;
            continue;
        }

        let payload = PublisherPayload { name };
        let id = ctx
            .create(Stage::Publishers, "publisher", endpoints::PUBLISHERS, &payload)
            .await?;
        name_to_id.insert(payload.name, id);
        ids.push(id);
    }

    tracing::info!(
        "Publishers ready: {} ({} reused, {} created)",
        ids.len(),
        reused,
        ids.len() - reused
    );
    Ok(())
}

async fn existing_publishers(ctx: &StageContext<'_>) -> Result<HashMap<String, i64>, SeedError> {
    let response = ctx.client.get(endpoints::PUBLISHERS).await?;
    let entries = ListExtractor::for_collection("publishers").extract(response.json_or_null());

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let name = first_str_in(entry, &["name"])?;
            let id = first_id_in(entry, &["id", "publisherId"])?;
            Some((name.to_string(), id))
        })
        .collect())
}
