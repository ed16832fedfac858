//! Value types collected from user input.
//!
//! # Design
//! `KeyValues` keeps entries in the order they were first entered, which is
//! the order query parameters and headers are emitted in. A repeated key
//! replaces the earlier value in place.

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// Ordered string-to-string mapping with last-write-wins on duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct KeyValues {
    entries: Vec<(String, String)>,
}

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries whose key is not blank. Only these reach an outgoing request.
    pub fn included(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, _)| !k.trim().is_empty())
    }

    /// Parse a `key=value` argument, splitting at the first `=`.
    pub fn parse_pair(raw: &str) -> Result<(String, String), ComposeError> {
        raw.split_once('=')
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .ok_or_else(|| ComposeError::MalformedPair(raw.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = KeyValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl From<Vec<(String, String)>> for KeyValues {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<KeyValues> for Vec<(String, String)> {
    fn from(values: KeyValues) -> Self {
        values.entries
    }
}

/// A request body and the content type it is sent with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    pub content_type: String,
    pub content: String,
}

impl RequestBody {
    pub fn new(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}
