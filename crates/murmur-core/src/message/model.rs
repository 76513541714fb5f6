//! Message models.

use serde::{Deserialize, Serialize};

use super::reaction::Reactions;
use crate::error::{ChatError, Result};

/// A message as stored by the data gateway.
///
/// Read-only from the core's point of view, except for the locally mutated
/// optimistic copy held by the application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque identifier, unique within its conversation
    pub id: String,
    /// Raw, unlinkified content as typed by the author
    pub text: String,
    /// Author identifier
    pub uid: String,
    /// Author display name at the time of writing
    pub user: String,
    /// Ordering key assigned by the store at write time
    pub timestamp: i64,
    #[serde(default)]
    pub reactions: Reactions,
    #[serde(default)]
    pub edited: bool,
    /// Number of replies in this message's thread
    #[serde(default)]
    pub thread_count: u32,
}

impl Message {
    /// Returns true when `uid` wrote this message.
    pub fn is_authored_by(&self, uid: &str) -> bool {
        self.uid == uid
    }

    /// Case-insensitive substring match on the text, as used by search.
    pub fn contains_term(&self, term: &str) -> bool {
        self.text.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Payload handed to the gateway when sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub uid: String,
    pub user: String,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>, uid: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            uid: uid.into(),
            user: user.into(),
        }
    }

    /// Checks the fields the store requires.
    ///
    /// Run at the gateway boundary so everything past it can rely on the
    /// entity shape.
    pub fn validate(&self) -> Result<()> {
        if self.uid.trim().is_empty() {
            return Err(ChatError::invalid_payload("message author uid is empty"));
        }
        if self.text.trim().is_empty() {
            return Err(ChatError::invalid_payload("message text is empty"));
        }
        Ok(())
    }
}
