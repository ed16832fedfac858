//! Cookie snapshots and change detection between request/response cycles.
//!
//! # Design
//! A `CookieSnapshot` is the full name-to-value set a jar holds for one host
//! at one point in time. `CookieTracker` remembers the snapshot taken after
//! the previous exchange and classifies what changed. It is an ordinary owned
//! value, so every session tracks its own cookies.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;

/// Cookies known for a host, keyed and iterated by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieSnapshot(BTreeMap<String, String>);

impl CookieSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parse a `Cookie` request header value (`a=1; b=2`) into a snapshot.
///
/// Pairs without `=` are skipped. A later duplicate name wins.
pub fn parse_cookie_header(header: &str) -> CookieSnapshot {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim(), value.trim()))
        .collect()
}

/// Check that `name=value` survives a trip through a `Cookie` header intact.
///
/// `;` and `,` would split the pair, control characters are not allowed on
/// the wire, and the name may not contain `=` or whitespace.
pub fn validate_cookie(name: &str, value: &str) -> Result<(), ComposeError> {
    let invalid = |reason| ComposeError::InvalidCookie {
        name: name.to_string(),
        reason,
    };
    let separator = |c: char| c == ';' || c == ',';

    if name.chars().any(|c| separator(c) || c == '=' || c.is_whitespace() || c.is_control()) {
        return Err(invalid("name contains a separator, whitespace or control character"));
    }
    if value.chars().any(|c| separator(c) || c.is_control()) {
        return Err(invalid("value contains ';', ',' or a control character"));
    }
    Ok(())
}

/// One classified difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CookieChange {
    Added { name: String, value: String },
    Modified { name: String, old: String, new: String },
    Removed { name: String },
}

impl CookieChange {
    pub fn name(&self) -> &str {
        match self {
            CookieChange::Added { name, .. }
            | CookieChange::Modified { name, .. }
            | CookieChange::Removed { name } => name,
        }
    }
}

impl fmt::Display for CookieChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieChange::Added { name, value } => write!(f, "added: {name} = {value}"),
            CookieChange::Modified { name, old, new } => {
                write!(f, "modified: {name} = {new} (was: {old})")
            }
            CookieChange::Removed { name } => write!(f, "removed: {name}"),
        }
    }
}

/// Classify the changes from `previous` to `current`.
///
/// Added and modified entries come first in `current`'s order, then removed
/// entries in `previous`'s order.
pub fn diff_snapshots(previous: &CookieSnapshot, current: &CookieSnapshot) -> Vec<CookieChange> {
    let mut changes = Vec::new();

    for (name, value) in current.iter() {
        match previous.get(name) {
            None => changes.push(CookieChange::Added {
                name: name.to_string(),
                value: value.to_string(),
            }),
            Some(old) if old != value => changes.push(CookieChange::Modified {
                name: name.to_string(),
                old: old.to_string(),
                new: value.to_string(),
            }),
            Some(_) => {}
        }
    }

    for (name, _) in previous.iter() {
        if !current.contains(name) {
            changes.push(CookieChange::Removed {
                name: name.to_string(),
            });
        }
    }

    changes
}

/// Remembers the last observed snapshot and reports changes against it.
#[derive(Debug, Clone, Default)]
pub struct CookieTracker {
    previous: CookieSnapshot,
}

impl CookieTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> &CookieSnapshot {
        &self.previous
    }

    /// Diff `current` against the remembered snapshot, then remember `current`.
    pub fn diff(&mut self, current: CookieSnapshot) -> Vec<CookieChange> {
        let changes = diff_snapshots(&self.previous, &current);
        self.previous = current;
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> CookieSnapshot {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_inputs_produce_no_changes() {
        let mut tracker = CookieTracker::new();
        assert!(tracker.diff(CookieSnapshot::new()).is_empty());
    }

    #[test]
    fn new_cookie_is_added() {
        let changes = diff_snapshots(&snapshot(&[("a", "1")]), &snapshot(&[("a", "1"), ("b", "2")]));
        assert_eq!(
            changes,
            vec![CookieChange::Added {
                name: "b".into(),
                value: "2".into()
            }]
        );
    }

    #[test]
    fn missing_cookie_is_removed() {
        let changes = diff_snapshots(&snapshot(&[("a", "1"), ("b", "2")]), &snapshot(&[("a", "1")]));
        assert_eq!(changes, vec![CookieChange::Removed { name: "b".into() }]);
    }

    #[test]
    fn changed_value_is_modified() {
        let changes = diff_snapshots(&snapshot(&[("a", "1")]), &snapshot(&[("a", "2")]));
        assert_eq!(
            changes,
            vec![CookieChange::Modified {
                name: "a".into(),
                old: "1".into(),
                new: "2".into()
            }]
        );
    }

    #[test]
    fn removals_follow_additions_and_modifications() {
        let previous = snapshot(&[("a", "1"), ("gone", "x"), ("m", "old")]);
        let current = snapshot(&[("a", "1"), ("m", "new"), ("z", "9")]);
        let names: Vec<_> = diff_snapshots(&previous, &current)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["m", "z", "gone"]);
    }

    #[test]
    fn tracker_replaces_previous_snapshot() {
        let mut tracker = CookieTracker::new();
        let current = snapshot(&[("a", "1"), ("b", "2")]);
        assert_eq!(tracker.diff(current.clone()).len(), 2);
        assert!(tracker.diff(current.clone()).is_empty());
        assert_eq!(tracker.previous(), &current);

        // overwrite, not merge
        tracker.diff(snapshot(&[("c", "3")]));
        assert_eq!(tracker.previous(), &snapshot(&[("c", "3")]));
    }

    #[test]
    fn cookie_header_is_parsed() {
        let parsed = parse_cookie_header("session=abc; test-cookie=test-value;broken; =x; t=a=b");
        assert_eq!(
            parsed,
            snapshot(&[("session", "abc"), ("test-cookie", "test-value"), ("t", "a=b")])
        );
    }

    #[test]
    fn plain_and_non_ascii_cookies_are_valid() {
        assert!(validate_cookie("session", "example_session_id").is_ok());
        assert!(validate_cookie("user", "José").is_ok());
        assert!(validate_cookie("empty", "").is_ok());
    }

    #[test]
    fn separators_in_value_are_rejected() {
        for value in ["a;b=c", "a,b", "line\nbreak", "tab\there"] {
            let err = validate_cookie("token", value).unwrap_err();
            assert!(
                matches!(err, ComposeError::InvalidCookie { ref name, .. } if name == "token"),
                "{value:?}"
            );
        }
    }

    #[test]
    fn bad_names_are_rejected() {
        for name in ["a=b", "a b", "a;b"] {
            assert!(validate_cookie(name, "v").is_err(), "{name:?}");
        }
    }

    #[test]
    fn change_lines_read_naturally() {
        let modified = CookieChange::Modified {
            name: "a".into(),
            old: "1".into(),
            new: "2".into(),
        };
        assert_eq!(modified.to_string(), "modified: a = 2 (was: 1)");
        assert_eq!(
            CookieChange::Removed { name: "b".into() }.to_string(),
            "removed: b"
        );
    }
}
