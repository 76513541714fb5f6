//! Conversation ids and recipient search.

use std::cmp::Ordering;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use super::model::RecipientSet;
use crate::user::{Channel, Member};

/// Joins the two participants of a whisper id.
const WHISPER_SEPARATOR: char = '_';

/// What a recipient search box value is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    /// `@...`: members by name
    User,
    /// `#...`: channels by name
    Channel,
    /// Anything else: members by email address
    Email,
    /// Empty input
    None,
}

/// Classifies a raw search box value.
pub fn classify_input(value: &str) -> SearchIntent {
    if value.starts_with('@') {
        SearchIntent::User
    } else if value.starts_with('#') {
        SearchIntent::Channel
    } else if value.is_empty() {
        SearchIntent::None
    } else {
        SearchIntent::Email
    }
}

/// Canonical whisper id for two participants.
///
/// The ids are sorted before joining, so argument order does not matter.
///
/// # Example
///
/// ```
/// use murmur_core::recipient::build_conversation_id;
///
/// assert_eq!(build_conversation_id("bob", "amy"), "amy_bob");
/// assert_eq!(build_conversation_id("amy", "bob"), "amy_bob");
/// ```
pub fn build_conversation_id(uid_a: &str, uid_b: &str) -> String {
    let (first, second) = if uid_a <= uid_b {
        (uid_a, uid_b)
    } else {
        (uid_b, uid_a)
    };
    format!("{first}{WHISPER_SEPARATOR}{second}")
}

/// The other participant of a whisper id.
///
/// The caller must be a participant. Debug builds panic when `my_uid` is
/// in neither half; release builds return the first half.
pub fn resolve_partner<'a>(conversation_id: &'a str, my_uid: &str) -> &'a str {
    let (first, second) = conversation_id
        .split_once(WHISPER_SEPARATOR)
        .unwrap_or((conversation_id, ""));
    debug_assert!(
        first == my_uid || second == my_uid,
        "{my_uid} is not a participant of {conversation_id}"
    );
    if first == my_uid { second } else { first }
}

/// Something a recipient search can return.
pub trait Candidate {
    /// Key compared against already-selected recipients
    fn identity_key(&self) -> &str;
    /// Name results are sorted by
    fn display_name(&self) -> &str;
    /// Field matched for `intent`, or `None` when this kind never matches it
    fn search_field(&self, intent: SearchIntent) -> Option<&str>;
}

impl Candidate for Member {
    fn identity_key(&self) -> &str {
        &self.uid
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_field(&self, intent: SearchIntent) -> Option<&str> {
        match intent {
            SearchIntent::User => Some(self.name.as_str()),
            SearchIntent::Email => Some(self.email.as_str()),
            SearchIntent::Channel | SearchIntent::None => None,
        }
    }
}

impl Candidate for Channel {
    fn identity_key(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn search_field(&self, intent: SearchIntent) -> Option<&str> {
        match intent {
            SearchIntent::Channel => Some(self.name.as_str()),
            _ => None,
        }
    }
}

/// Locale-aware ordering (root collation), falling back to exact order for ties.
fn compare_names(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Filters `items` for a search.
///
/// Already-selected recipients are dropped first; the rest must contain
/// `query` (case-insensitive) in the field `intent` selects. An empty query
/// keeps everything. Results are sorted by display name with the Unicode
/// collation order, so accented names sort next to their base letter.
pub fn filter_candidates<'a, T: Candidate>(
    items: &'a [T],
    query: &str,
    intent: SearchIntent,
    selected: &RecipientSet,
) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    let mut matches: Vec<&T> = items
        .iter()
        .filter(|item| !selected.contains_key(item.identity_key()))
        .filter(|item| {
            item.search_field(intent)
                .is_some_and(|field| needle.is_empty() || field.to_lowercase().contains(&needle))
        })
        .collect();
    let mut collator = Collator::default();
    matches.sort_by(|a, b| compare_names(&mut collator, a.display_name(), b.display_name()));
    matches
}

/// Outcome of a recipient search box query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResults<'a> {
    pub intent: SearchIntent,
    pub members: Vec<&'a Member>,
    pub channels: Vec<&'a Channel>,
}

/// Runs a search box value against the directory.
///
/// `@` and `#` are stripped before matching names; email search matches the
/// raw input.
pub fn search_candidates<'a>(
    input: &str,
    members: &'a [Member],
    channels: &'a [Channel],
    selected: &RecipientSet,
) -> CandidateResults<'a> {
    let intent = classify_input(input);
    let (members, channels) = match intent {
        SearchIntent::User => (
            filter_candidates(members, &input[1..], intent, selected),
            Vec::new(),
        ),
        SearchIntent::Channel => (
            Vec::new(),
            filter_candidates(channels, &input[1..], intent, selected),
        ),
        SearchIntent::Email => (
            filter_candidates(members, input, intent, selected),
            Vec::new(),
        ),
        SearchIntent::None => (Vec::new(), Vec::new()),
    };
    CandidateResults {
        intent,
        members,
        channels,
    }
}
