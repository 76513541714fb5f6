//! Reactions and the reaction reducer.
//!
//! Invariant: no emoji key ever maps to an empty participant list. The key
//! is removed the instant its last participant leaves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emoji glyph → participant ids, in the order they reacted.
///
/// Deserialization drops empty lists, so a map read from the store already
/// satisfies the invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>", into = "BTreeMap<String, Vec<String>>")]
pub struct Reactions(BTreeMap<String, Vec<String>>);

impl From<BTreeMap<String, Vec<String>>> for Reactions {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Reactions> for BTreeMap<String, Vec<String>> {
    fn from(reactions: Reactions) -> Self {
        reactions.0
    }
}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Participants that reacted with `emoji`, if any did.
    pub fn participants(&self, emoji: &str) -> Option<&[String]> {
        self.0.get(emoji).map(Vec::as_slice)
    }

    /// Returns true when `participant` reacted with `emoji`.
    pub fn has_reacted(&self, emoji: &str, participant: &str) -> bool {
        self.participants(emoji)
            .is_some_and(|p| p.iter().any(|id| id == participant))
    }

    pub fn count(&self, emoji: &str) -> usize {
        self.participants(emoji).map_or(0, <[String]>::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl FromIterator<(String, Vec<String>)> for Reactions {
    /// Builds a map, dropping entries whose participant list is empty.
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|(_, v)| !v.is_empty()).collect())
    }
}

/// Applies an add/remove toggle for one participant.
///
/// - `add = true` appends `participant` to `emoji` unless already present.
/// - `add = false` removes it if present.
/// - An emptied key is deleted.
///
/// Idempotent for repeated identical calls. The data gateway applies the
/// same semantics remotely, so the local result matches what the store
/// converges to.
///
/// # Example
///
/// ```
/// use murmur_core::message::{Reactions, apply_reaction};
///
/// let added = apply_reaction(&Reactions::new(), "👍", "u-1", true);
/// assert_eq!(added.count("👍"), 1);
/// let removed = apply_reaction(&added, "👍", "u-1", false);
/// assert!(removed.participants("👍").is_none());
/// ```
pub fn apply_reaction(reactions: &Reactions, emoji: &str, participant: &str, add: bool) -> Reactions {
    let mut next = reactions.clone();
    let entry = next.0.entry(emoji.to_string()).or_default();

    if add {
        if !entry.iter().any(|id| id == participant) {
            entry.push(participant.to_string());
        }
    } else {
        entry.retain(|id| id != participant);
    }

    if entry.is_empty() {
        next.0.remove(emoji);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reactions(entries: &[(&str, &[&str])]) -> Reactions {
        entries
            .iter()
            .map(|(emoji, ids)| {
                (
                    emoji.to_string(),
                    ids.iter().map(|id| id.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_add_appends_at_end() {
        let start = reactions(&[("👍", &["a"])]);
        let next = apply_reaction(&start, "👍", "b", true);
        assert_eq!(
            next.participants("👍").unwrap(),
            &["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let once = apply_reaction(&Reactions::new(), "❤️", "a", true);
        let twice = apply_reaction(&once, "❤️", "a", true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let start = reactions(&[("❤️", &["a", "b"])]);
        let once = apply_reaction(&start, "❤️", "a", false);
        let twice = apply_reaction(&once, "❤️", "a", false);
        assert_eq!(once, twice);
        assert_eq!(twice.count("❤️"), 1);
    }

    #[test]
    fn test_add_then_remove_round_trips_to_absence() {
        let start = reactions(&[("😂", &["z"])]);
        let added = apply_reaction(&start, "👍", "a", true);
        let removed = apply_reaction(&added, "👍", "a", false);
        assert!(removed.participants("👍").is_none());
        assert_eq!(removed, start);
    }

    #[test]
    fn test_removing_last_participant_deletes_key() {
        let start = reactions(&[("👍", &["a"])]);
        let next = apply_reaction(&start, "👍", "a", false);
        assert!(next.is_empty());
    }

    #[test]
    fn test_remove_of_missing_emoji_leaves_no_empty_key() {
        let next = apply_reaction(&Reactions::new(), "👎", "a", false);
        assert!(next.is_empty());
        assert!(next.iter().all(|(_, ids)| !ids.is_empty()));
    }

    #[test]
    fn test_from_iter_drops_empty_lists() {
        let map = reactions(&[("👍", &[]), ("❤️", &["a"])]);
        assert!(map.participants("👍").is_none());
        assert!(map.has_reacted("❤️", "a"));
    }

    #[test]
    fn test_deserialize_drops_empty_lists() {
        let map: Reactions = serde_json::from_str(r#"{"👍":[],"❤️":["a"]}"#).unwrap();
        assert!(map.participants("👍").is_none());
        assert_eq!(map.count("❤️"), 1);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let map = reactions(&[("👍", &["a"])]);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"👍":["a"]}"#);
    }
}
