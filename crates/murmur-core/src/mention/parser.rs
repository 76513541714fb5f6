//! In-progress mention detection.
//!
//! Re-run on every keystroke or cursor move. All indices are character
//! offsets into the composer text, not byte offsets.

use serde::{Deserialize, Serialize};

/// Longest query (in whitespace-separated words) still treated as a mention.
const MAX_QUERY_WORDS: usize = 2;

/// The character that opened a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// `@`, a member
    #[serde(rename = "@")]
    User,
    /// `#`, a channel
    #[serde(rename = "#")]
    Channel,
}

impl Trigger {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '@' => Some(Self::User),
            '#' => Some(Self::Channel),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::User => '@',
            Self::Channel => '#',
        }
    }
}

/// Composer-local descriptor of the mention being typed.
///
/// `start_index < end_index` always holds; the descriptor is dropped as soon
/// as the text no longer parses as a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMention {
    pub trigger: Trigger,
    /// Position of the trigger character (inclusive)
    pub start_index: usize,
    /// Cursor position (exclusive)
    pub end_index: usize,
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionMatch {
    pub trigger: Trigger,
    /// Everything between the trigger and the cursor
    pub raw_query: String,
    /// `raw_query` with surrounding whitespace removed
    pub query: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl MentionMatch {
    pub fn active(&self) -> ActiveMention {
        ActiveMention {
            trigger: self.trigger,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

/// Detects the mention being typed at `cursor`.
///
/// The rightmost `@` or `#` before the cursor is the candidate trigger. It
/// must start a word (be first or follow whitespace), and the text after it
/// may hold at most two words. A cursor past the end is clamped.
///
/// # Example
///
/// ```
/// use murmur_core::mention::{Trigger, parse_mention};
///
/// let m = parse_mention("Hello @Jo", 9).unwrap();
/// assert_eq!(m.trigger, Trigger::User);
/// assert_eq!((m.start_index, m.end_index), (6, 9));
/// assert_eq!(m.query, "Jo");
/// ```
pub fn parse_mention(text: &str, cursor: usize) -> Option<MentionMatch> {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let before = &chars[..cursor];

    let trigger_index = before.iter().rposition(|c| *c == '@' || *c == '#')?;
    if trigger_index > 0 && !before[trigger_index - 1].is_whitespace() {
        return None;
    }

    let raw_query: String = before[trigger_index + 1..].iter().collect();
    if raw_query.split_whitespace().count() > MAX_QUERY_WORDS {
        return None;
    }

    let trigger = Trigger::from_char(before[trigger_index])?;
    Some(MentionMatch {
        trigger,
        query: raw_query.trim().to_string(),
        raw_query,
        start_index: trigger_index,
        end_index: cursor,
    })
}
