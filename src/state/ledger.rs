use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Role a seeded account holds on the remote system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Reader,
    Librarian,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Reader => "READER",
            UserRole::Librarian => "LIBRARIAN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Login record for one seeded account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Every reader account created during a run, plaintext passwords included
///
/// Written to disk so later manual or automated logins can reuse the accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialLedger {
    records: Vec<CredentialRecord>,
}

impl CredentialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CredentialRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.username == username)
    }

    /// Sets `role` on every record whose username is listed
    ///
    /// Returns how many records changed.
    pub fn promote<S: AsRef<str>>(&mut self, usernames: &[S], role: UserRole) -> usize {
        let mut changed = 0;
        for record in &mut self.records {
            if record.role != role && usernames.iter().any(|u| u.as_ref() == record.username) {
                record.role = role;
                changed += 1;
            }
        }
        changed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }

    /// Overwrites `path` with the ledger as a JSON array
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::from)?;
        std::fs::write(path, json)
    }
}
