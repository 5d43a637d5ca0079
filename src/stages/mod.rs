//! Stage executors
//!
//! Every stage follows the same shape: read the upstream identifiers it
//! needs from the pipeline state, loop over a configured count building
//! payloads with the generators, call the API, extract the created
//! identifier and write its results back into the state.
//!
//! Results are written as they accumulate, so a stage that fails midway
//! still leaves the identifiers it did create in the state.

pub mod authors;
pub mod books;
pub mod copies;
pub mod editions;
pub mod librarians;
pub mod publishers;
pub mod readers;
pub mod rentals;
pub mod reviews;
pub mod users;

use crate::client::{ApiClient, ApiResponse};
use crate::config::SeedConfig;
use crate::extract::{IdExtractor, IdScope};
use crate::state::Stage;
use crate::SeedError;
use chrono::NaiveDate;
use serde::Serialize;

pub use readers::resolve_reader_ids;
pub use rentals::CopyPool;

/// Statuses treated as "account already exists" on registration
pub const REGISTER_CONFLICT_STATUSES: [u16; 2] = [400, 409];

/// Statuses treated as "already a librarian" on promotion
pub const LIBRARIAN_CONFLICT_STATUSES: [u16; 2] = [400, 409];

/// Statuses that skip a single review instead of failing the stage
pub const REVIEW_SKIP_STATUSES: [u16; 3] = [400, 409, 422];

/// What every stage receives from the driver besides state and randomness
#[derive(Debug, Clone)]
pub struct StageContext<'a> {
    pub client: &'a ApiClient,
    pub seed: &'a SeedConfig,
    pub id_scope: IdScope,
    pub today: NaiveDate,
}

impl<'a> StageContext<'a> {
    pub fn new(client: &'a ApiClient, seed: &'a SeedConfig, id_scope: IdScope, today: NaiveDate) -> Self {
        Self {
            client,
            seed,
            id_scope,
            today,
        }
    }

    /// Posts `payload` to `path` and returns the created identifier
    ///
    /// A 2xx response without an identifier fails the stage.
    pub async fn create<P: Serialize>(
        &self,
        stage: Stage,
        entity: &'static str,
        path: &str,
        payload: &P,
    ) -> Result<i64, SeedError> {
        let body = serde_json::to_value(payload)?;
        let response = self.client.post(path, Some(&body)).await?;
        self.created_id(stage, entity, &response)
    }

    /// Extracts the identifier of a created `entity` from `response`
    pub fn created_id(&self, stage: Stage, entity: &'static str, response: &ApiResponse) -> Result<i64, SeedError> {
        IdExtractor::for_entity(entity, self.id_scope)
            .extract(response.json_or_null())
            .ok_or_else(|| SeedError::MissingIdentifier {
                stage,
                entity,
                response: response.to_string(),
            })
    }
}

