use crate::client::endpoints;
use crate::extract::{first_id_in, first_str_in, ListExtractor};
use crate::generate::readers::reader;
use crate::generate::SeedRng;
use crate::stages::{StageContext, REGISTER_CONFLICT_STATUSES};
use crate::state::{CredentialLedger, PipelineState};
use crate::SeedError;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Registers `seed.readers` reader accounts and resolves their identifiers
///
/// Registration answers without a body, so identifiers come from a single
/// user listing afterwards. A 400/409 on registration means the account most
/// likely exists from an earlier run; the username is kept and its ledger
/// entry is marked. The credential ledger is written to
/// `seed.credentials-path`.
///
/// Writes `reader_usernames`, `reader_ids`, `reader_ids_by_username`,
/// `user_credentials` and `user_credentials_path`.
pub async fn seed(ctx: &StageContext<'_>, state: &mut PipelineState, rng: &mut SeedRng) -> Result<(), SeedError> {
    let count = ctx.seed.readers;
    if count == 0 {
        tracing::info!("No readers requested");
        state.reader_usernames = Some(Vec::new());
        state.reader_ids = Some(Vec::new());
        state.reader_ids_by_username = Some(BTreeMap::new());
        state.user_credentials = Some(CredentialLedger::new());
        return Ok(());
    }

    let mut usernames = Vec::with_capacity(count);
    let mut ledger = CredentialLedger::new();

    for index in 0..count {
        let payload = reader(rng, &ctx.seed.username_prefix, index, ctx.today);
        let body = serde_json::to_value(&payload)?;

        let note = match ctx.client.post(endpoints::REGISTER, Some(&body)).await {
            Ok(_) => None,
            Err(e) if e.is_status_in(&REGISTER_CONFLICT_STATUSES) => {
                tracing::warn!("Reader {} not registered ({}), assuming it exists", payload.username, e);
                Some(format!("already existed ({})", e.status().unwrap_or_default()))
            }
            Err(e) => return Err(e.into()),
        };

        ledger.push(payload.credentials(note));
        usernames.push(payload.username);
    }

    let known = user_ids_by_username(ctx).await?;
    let mut reader_ids = Vec::with_capacity(usernames.len());
    let mut ids_by_username = BTreeMap::new();
    for username in &usernames {
        match known.get(username) {
            Some(id) => {
                reader_ids.push(*id);
                ids_by_username.insert(username.clone(), *id);
            }
            None => tracing::warn!("Reader {} missing from the user listing", username),
        }
    }

    let path = PathBuf::from(&ctx.seed.credentials_path);
    ledger.write_to(&path).map_err(|source| SeedError::CredentialFile {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(
        "Registered {} readers ({} resolved), credentials written to {}",
        usernames.len(),
        reader_ids.len(),
        path.display()
    );

    state.reader_usernames = Some(usernames);
    state.reader_ids = Some(reader_ids);
    state.reader_ids_by_username = Some(ids_by_username);
    state.user_credentials = Some(ledger);
    state.user_credentials_path = Some(path);
    Ok(())
}

/// Username to identifier for every account the API lists
pub(crate) async fn user_ids_by_username(ctx: &StageContext<'_>) -> Result<BTreeMap<String, i64>, SeedError> {
    let response = ctx.client.get(endpoints::USERS).await?;
    let entries = ListExtractor::for_collection("users").extract(response.json_or_null());

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let username = first_str_in(entry, &["username"])?;
            let id = first_id_in(entry, &["id", "userId", "user_id"])?;
            Some((username.to_string(), id))
        })
        .collect())
}
