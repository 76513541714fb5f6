//! Composer state.
//!
//! Owned by the UI thread and mutated only in response to input events.
//! Every input re-parses the text at the cursor; the newest parse replaces
//! whatever mention was active before.

use murmur_core::emoji::to_emoji;
use murmur_core::mention::{ActiveMention, parse_mention};
use murmur_core::recipient::{Recipient, RecipientSet};
use murmur_core::user::{Channel, Member};
use serde::{Deserialize, Serialize};

/// A mention completion offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionCandidate {
    Member(Member),
    Channel(Channel),
}

impl MentionCandidate {
    /// Text inserted after the trigger when this candidate is picked.
    pub fn name(&self) -> &str {
        match self {
            Self::Member(member) => &member.name,
            Self::Channel(channel) => &channel.name,
        }
    }
}

/// What a send action hands to the use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingDraft {
    pub text: String,
    /// Broadcast targets; empty means "the current conversation"
    pub recipients: Vec<Recipient>,
}

/// Serializable composer state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerState {
    pub text: String,
    /// Cursor as a character offset into `text`
    pub cursor: usize,
    pub active_mention: Option<ActiveMention>,
    /// Trimmed query of the active mention, empty when none is active
    pub mention_query: String,
    pub recipients: RecipientSet,
}

impl ComposerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records new text and cursor and re-parses the mention under the cursor.
    pub fn on_input(&mut self, text: impl Into<String>, cursor: usize) {
        self.text = text.into();
        self.cursor = cursor.min(self.text.chars().count());
        self.reparse();
    }

    /// Moves the cursor without changing the text.
    pub fn move_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.text.chars().count());
        self.reparse();
    }

    fn reparse(&mut self) {
        match parse_mention(&self.text, self.cursor) {
            Some(found) => {
                self.active_mention = Some(found.active());
                self.mention_query = found.query;
            }
            None => self.clear_mention(),
        }
    }

    fn clear_mention(&mut self) {
        self.active_mention = None;
        self.mention_query.clear();
    }

    /// Replaces the active mention range with `trigger + name + " "`.
    ///
    /// The cursor lands after the inserted space. Does nothing when no
    /// mention is active.
    pub fn select_mention(&mut self, name: &str) {
        let Some(active) = self.active_mention else {
            return;
        };

        let chars: Vec<char> = self.text.chars().collect();
        let end = active.end_index.min(chars.len());
        let start = active.start_index.min(end);
        let insertion = format!("{}{name} ", active.trigger.as_char());

        let mut text: String = chars[..start].iter().collect();
        text.push_str(&insertion);
        text.extend(&chars[end..]);

        self.text = text;
        self.cursor = start + insertion.chars().count();
        self.clear_mention();
    }

    /// Dismisses the active mention (escape key).
    pub fn escape(&mut self) {
        self.clear_mention();
    }

    /// Adds a broadcast target; returns false when it was already selected.
    pub fn add_recipient(&mut self, recipient: Recipient) -> bool {
        self.recipients.insert(recipient)
    }

    pub fn remove_recipient(&mut self, key: &str) -> Option<Recipient> {
        self.recipients.remove(key)
    }

    /// Takes the composed message and resets the composer.
    ///
    /// Returns `None` (leaving the state untouched) when the text is blank.
    /// Recipients are consumed by the send.
    pub fn take_outgoing(&mut self, normalize_emoji: bool) -> Option<OutgoingDraft> {
        if self.text.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.text);
        let text = if normalize_emoji { to_emoji(&text) } else { text };
        let draft = OutgoingDraft {
            text,
            recipients: self.recipients.drain(),
        };
        self.cursor = 0;
        self.clear_mention();
        Some(draft)
    }
}
