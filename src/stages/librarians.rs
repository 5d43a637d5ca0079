use crate::client::endpoints;
use crate::generate::SeedRng;
use crate::stages::{StageContext, LIBRARIAN_CONFLICT_STATUSES};
use crate::state::{PipelineState, Stage, StateKey, UserRole};
use crate::SeedError;
use rand::seq::IndexedRandom;
use serde_json::json;

/// Promotes a random sample of the registered readers to librarians
///
/// A 400/409 answer means the account already holds the role and counts as
/// promoted. Promoted accounts are marked in the credential ledger, which is
/// rewritten when it was persisted.
///
/// Requires `reader_usernames` (an empty list promotes nobody).
/// Writes `librarian_usernames`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let usernames = state
        .reader_usernames
        .clone()
        .ok_or(SeedError::MissingPrecondition {
            stage: Stage::Librarians,
            key: StateKey::ReaderUsernames,
            producer: StateKey::ReaderUsernames.producer(),
        })?;

    if usernames.is_empty() {
        tracing::info!("No readers to promote");
        state.librarian_usernames = Some(Vec::new());
        return Ok(());
    }

    let wanted = ctx.seed.effective_librarians(usernames.len());
    let picks: Vec<String> = usernames.choose_multiple(rng, wanted).cloned().collect();
    let promoted = state.librarian_usernames.insert(Vec::with_capacity(picks.len()));

    for username in picks {
        let payload = json!({ "username": username });
        match ctx.client.post(endpoints::LIBRARIANS, Some(&payload)).await {
            Ok(_) => tracing::debug!("Promoted {} to librarian", username),
            Err(e) if e.is_status_in(&LIBRARIAN_CONFLICT_STATUSES) => {
                tracing::debug!("{} already a librarian ({:?})", username, e.status());
            }
            Err(e) => return Err(e.into()),
        }
        promoted.push(username);
    }

    tracing::info!("Promoted {} librarians", promoted.len());

    if let Some(ledger) = state.user_credentials.as_mut() {
        let changed = ledger.promote(promoted.as_slice(), UserRole::Librarian);
        if let Some(path) = &state.user_credentials_path {
            ledger.write_to(path).map_err(|source| SeedError::CredentialFile {
                path: path.display().to_string(),
                source,
            })?;
            tracing::debug!("Rewrote {} with {} promoted accounts", path.display(), changed);
        }
    }

    Ok(())
}
