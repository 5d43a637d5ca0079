use crate::state::ledger::CredentialLedger;
use crate::state::stage::{Stage, StateKey};
use crate::SeedError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Identifiers grouped under a parent identifier (e.g. copies by edition)
pub type IdGroups = BTreeMap<i64, Vec<i64>>;

/// The single context threaded through every stage
///
/// Each field is one state key; `None` means the producing stage has not run.
/// Stages only ever add keys. `version` increases every time a stage commits
/// its results, so callers can tell two snapshots of the same run apart.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    version: u64,
    completed: Vec<Stage>,

    pub author_ids: Option<Vec<i64>>,
    pub publisher_ids: Option<Vec<i64>>,
    pub book_ids: Option<Vec<i64>>,
    pub book_edition_ids: Option<Vec<i64>>,
    pub book_id_to_edition_ids: Option<IdGroups>,
    pub book_copy_ids: Option<Vec<i64>>,
    pub book_copy_ids_by_edition: Option<IdGroups>,
    pub reader_usernames: Option<Vec<String>>,
    pub reader_ids: Option<Vec<i64>>,
    pub reader_ids_by_username: Option<BTreeMap<String, i64>>,
    pub user_credentials: Option<CredentialLedger>,
    pub user_credentials_path: Option<PathBuf>,
    pub librarian_usernames: Option<Vec<String>>,
    pub rental_ids: Option<Vec<i64>>,
    pub returned_rental_ids: Option<Vec<i64>>,
    pub rented_copy_ids: Option<Vec<i64>>,
    pub review_ids: Option<Vec<i64>>,
    pub reviews_created: Option<usize>,
}

/// Value shown for one key in the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryValue {
    Count(usize),
    Text(String),
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryValue::Count(n) => write!(f, "{}", n),
            SummaryValue::Text(s) => f.write_str(s),
        }
    }
}

impl PipelineState {
    /// Creates an empty state at version 0
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn completed_stages(&self) -> &[Stage] {
        &self.completed
    }

    pub fn has_completed(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Records that `stage` finished writing its keys
    pub fn commit(&mut self, stage: Stage) {
        self.version += 1;
        if !self.completed.contains(&stage) {
            self.completed.push(stage);
        }
    }

    /// The alias key kept for consumers that look editions up per book
    pub fn book_edition_ids_by_book(&self) -> Option<&IdGroups> {
        self.book_id_to_edition_ids.as_ref()
    }

    /// Maps an edition back to the book it belongs to
    pub fn book_for_edition(&self, edition_id: i64) -> Option<i64> {
        self.book_id_to_edition_ids.as_ref().and_then(|groups| {
            groups
                .iter()
                .find(|(_, editions)| editions.contains(&edition_id))
                .map(|(book, _)| *book)
        })
    }

    /// Maps a copy back to the edition it belongs to
    pub fn edition_for_copy(&self, copy_id: i64) -> Option<i64> {
        self.book_copy_ids_by_edition.as_ref().and_then(|groups| {
            groups
                .iter()
                .find(|(_, copies)| copies.contains(&copy_id))
                .map(|(edition, _)| *edition)
        })
    }

    /// Count or value for every key that has been written, in key order
    pub fn summary(&self) -> Vec<(StateKey, SummaryValue)> {
        use SummaryValue::{Count, Text};

        let groups = |g: &IdGroups| g.len();
        let entries = [
            (StateKey::AuthorIds, self.author_ids.as_ref().map(|v| Count(v.len()))),
            (StateKey::PublisherIds, self.publisher_ids.as_ref().map(|v| Count(v.len()))),
            (StateKey::BookIds, self.book_ids.as_ref().map(|v| Count(v.len()))),
            (StateKey::BookEditionIds, self.book_edition_ids.as_ref().map(|v| Count(v.len()))),
            (
                StateKey::BookIdToEditionIds,
                self.book_id_to_edition_ids.as_ref().map(|g| Count(groups(g))),
            ),
            (
                StateKey::BookEditionIdsByBook,
                self.book_id_to_edition_ids.as_ref().map(|g| Count(groups(g))),
            ),
            (StateKey::BookCopyIds, self.book_copy_ids.as_ref().map(|v| Count(v.len()))),
            (
                StateKey::BookCopyIdsByEdition,
                self.book_copy_ids_by_edition.as_ref().map(|g| Count(groups(g))),
            ),
            (StateKey::ReaderUsernames, self.reader_usernames.as_ref().map(|v| Count(v.len()))),
            (StateKey::ReaderIds, self.reader_ids.as_ref().map(|v| Count(v.len()))),
            (
                StateKey::ReaderIdsByUsername,
                self.reader_ids_by_username.as_ref().map(|m| Count(m.len())),
            ),
            (StateKey::UserCredentials, self.user_credentials.as_ref().map(|l| Count(l.len()))),
            (
                StateKey::UserCredentialsPath,
                self.user_credentials_path
                    .as_ref()
                    .map(|p| Text(p.display().to_string())),
            ),
            (
                StateKey::LibrarianUsernames,
                self.librarian_usernames.as_ref().map(|v| Count(v.len())),
            ),
            (StateKey::RentalIds, self.rental_ids.as_ref().map(|v| Count(v.len()))),
            (
                StateKey::ReturnedRentalIds,
                self.returned_rental_ids.as_ref().map(|v| Count(v.len())),
            ),
            (StateKey::RentedCopyIds, self.rented_copy_ids.as_ref().map(|v| Count(v.len()))),
            (StateKey::ReviewIds, self.review_ids.as_ref().map(|v| Count(v.len()))),
            (StateKey::ReviewsCreated, self.reviews_created.map(|n| Text(n.to_string()))),
        ];

        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

/// Returns the required list or a missing-precondition error naming the key
///
/// A key that is present but empty counts as missing.
pub fn require<'a, T>(
    value: &'a Option<Vec<T>>,
    key: StateKey,
    stage: Stage,
) -> Result<&'a [T], SeedError> {
    match value {
        Some(items) if !items.is_empty() => Ok(items.as_slice()),
        _ => Err(SeedError::MissingPrecondition {
            stage,
            key,
            producer: key.producer(),
        }),
    }
}
