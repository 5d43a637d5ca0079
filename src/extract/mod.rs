//! Response-shape tolerant extraction
//!
//! The API does not promise one response shape, so every lookup is an ordered
//! list of strategies tried in sequence; the first one that matches wins.
//!
//! - identifiers: `id`, `<entity>Id`, `<entity>_id`, optionally under `data`
//! - lists: a bare array or an array under one of several wrapper keys
//! - tokens: the usual JWT field names, at the root or under `data`

use serde_json::{Map, Value};

/// Where to look for a single value inside a JSON object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// A key at the root object
    Field(String),
    /// A key inside a nested object (e.g. `data.id`)
    Nested { parent: String, field: String },
}

impl Strategy {
    pub fn field(name: impl Into<String>) -> Self {
        Strategy::Field(name.into())
    }

    pub fn nested(parent: impl Into<String>, field: impl Into<String>) -> Self {
        Strategy::Nested {
            parent: parent.into(),
            field: field.into(),
        }
    }

    fn locate<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match self {
            Strategy::Field(name) => value.as_object()?.get(name),
            Strategy::Nested { parent, field } => value.as_object()?.get(parent)?.as_object()?.get(field),
        }
    }
}

/// Tries each strategy in order and returns the first converted match
pub fn first_match<T, F>(value: &Value, strategies: &[Strategy], convert: F) -> Option<T>
where
    F: Fn(&Value) -> Option<T>,
{
    strategies
        .iter()
        .filter_map(|strategy| strategy.locate(value))
        .find_map(convert)
}

/// Accepts JSON integers and numeric strings
pub fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts non-empty JSON strings
pub fn as_token(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}

/// How deep identifier lookups go
///
/// Login always tolerates a `data` wrapper; entity creation only does when
/// configured, so a contract mismatch is not silently masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdScope {
    #[default]
    Root,
    RootOrData,
}

impl IdScope {
    pub fn from_nested(nested: bool) -> Self {
        if nested {
            IdScope::RootOrData
        } else {
            IdScope::Root
        }
    }
}

/// Identifier lookup for one entity kind
#[derive(Debug, Clone)]
pub struct IdExtractor {
    strategies: Vec<Strategy>,
}

impl IdExtractor {
    /// Builds the strategy list for a camelCase `entity`
    /// (e.g. "bookEdition" → `id`, `bookEditionId`, `book_edition_id`)
    pub fn for_entity(entity: &str, scope: IdScope) -> Self {
        let keys = [
            "id".to_string(),
            format!("{}Id", entity),
            format!("{}_id", snake_case(entity)),
        ];

        let mut strategies: Vec<Strategy> = keys.iter().map(Strategy::field).collect();
        if scope == IdScope::RootOrData {
            strategies.extend(keys.iter().map(|k| Strategy::nested("data", k)));
        }

        Self { strategies }
    }

    pub fn extract(&self, value: &Value) -> Option<i64> {
        first_match(value, &self.strategies, as_id)
    }
}

fn snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

const TOKEN_FIELDS: [&str; 5] = ["jwtToken", "token", "accessToken", "jwt", "bearerToken"];

/// Extracts a bearer token from a login response
pub fn extract_token(value: &Value) -> Option<String> {
    let strategies: Vec<Strategy> = TOKEN_FIELDS
        .iter()
        .map(|f| Strategy::field(*f))
        .chain(TOKEN_FIELDS.iter().map(|f| Strategy::nested("data", *f)))
        .collect();
    first_match(value, &strategies, as_token)
}

/// Where a list of objects may live in a listing response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStrategy {
    Bare,
    Wrapped(String),
}

/// List lookup for one listing endpoint
#[derive(Debug, Clone)]
pub struct ListExtractor {
    strategies: Vec<ListStrategy>,
}

const GENERIC_WRAPPERS: [&str; 4] = ["items", "data", "results", "content"];

impl ListExtractor {
    /// Bare array, then `<collection>`, then the generic wrapper keys
    pub fn for_collection(collection: &str) -> Self {
        let mut strategies = vec![ListStrategy::Bare, ListStrategy::Wrapped(collection.to_string())];
        strategies.extend(
            GENERIC_WRAPPERS
                .iter()
                .filter(|w| **w != collection)
                .map(|w| ListStrategy::Wrapped(w.to_string())),
        );
        Self { strategies }
    }

    /// Returns the object entries of the first matching array
    ///
    /// Non-object entries are dropped; no match yields an empty list.
    pub fn extract<'v>(&self, value: &'v Value) -> Vec<&'v Map<String, Value>> {
        self.strategies
            .iter()
            .find_map(|strategy| match strategy {
                ListStrategy::Bare => value.as_array(),
                ListStrategy::Wrapped(key) => value.as_object()?.get(key)?.as_array(),
            })
            .map(|items| items.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default()
    }
}

/// First integer found under any of `keys` in a listing entry
pub fn first_id_in(entry: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .filter(|v| !v.is_null())
        .find_map(as_id)
}

/// First string found under any of `keys` in a listing entry
pub fn first_str_in<'v>(entry: &'v Map<String, Value>, keys: &[&str]) -> Option<&'v str> {
    keys.iter().filter_map(|k| entry.get(*k)).find_map(Value::as_str)
}
