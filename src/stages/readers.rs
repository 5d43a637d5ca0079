//! Reader resolution shared by the rental and review stages

use crate::client::endpoints;
use crate::extract::{first_id_in, first_str_in, ListExtractor};
use crate::stages::StageContext;
use crate::state::{PipelineState, Stage, StateKey, UserRole};
use crate::SeedError;
use std::collections::HashSet;

/// Identifiers of reader accounts usable by `stage`
///
/// Prefers `reader_ids` from the state. Without it the full user listing is
/// fetched and filtered to the `READER` role, so the stage also works against
/// state from a partial earlier run. With `exclude_librarians`, accounts
/// listed in `librarian_usernames` are left out either way.
pub async fn resolve_reader_ids(
    ctx: &StageContext<'_>,
    state: &PipelineState,
    stage: Stage,
    exclude_librarians: bool,
) -> Result<Vec<i64>, SeedError> {
    let librarians: HashSet<&str> = match (&state.librarian_usernames, exclude_librarians) {
        (Some(names), true) => names.iter().map(String::as_str).collect(),
        _ => HashSet::new(),
    };

    let ids = match state.reader_ids.as_deref() {
        Some(ids) if !ids.is_empty() => {
            let excluded: HashSet<i64> = state
                .reader_ids_by_username
                .iter()
                .flatten()
                .filter(|(name, _)| librarians.contains(name.as_str()))
                .map(|(_, id)| *id)
                .collect();
            ids.iter().copied().filter(|id| !excluded.contains(id)).collect()
        }
        _ => {
            tracing::debug!("{}: no reader_ids in state, resolving from the user listing", stage);
            listed_reader_ids(ctx, &librarians).await?
        }
    };

    if ids.is_empty() {
        return Err(SeedError::MissingPrecondition {
            stage,
            key: StateKey::ReaderIds,
            producer: StateKey::ReaderIds.producer(),
        });
    }
    Ok(ids)
}

async fn listed_reader_ids(ctx: &StageContext<'_>, excluded: &HashSet<&str>) -> Result<Vec<i64>, SeedError> {
    let response = ctx.client.get(endpoints::USERS).await?;
    let entries = ListExtractor::for_collection("users").extract(response.json_or_null());

    Ok(entries
        .into_iter()
        .filter(|entry| first_str_in(entry, &["role"]) == Some(UserRole::Reader.as_str()))
        .filter(|entry| {
            first_str_in(entry, &["username"]).map_or(true, |name| !excluded.contains(name))
        })
        .filter_map(|entry| first_id_in(entry, &["id", "userId", "user_id"]))
        .collect())
}
