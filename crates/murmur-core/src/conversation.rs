//! Conversation references.
//!
//! A conversation is wherever a list of messages lives: a channel, a whisper
//! between two participants, or the thread under one message.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::recipient::{build_conversation_id, resolve_partner};

/// Identifies a message list in the data store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConversationRef {
    Channel {
        id: String,
    },
    /// Direct conversation, keyed by the canonical whisper id
    Whisper {
        id: String,
    },
    /// Replies to one message of another conversation
    Thread {
        parent: Box<ConversationRef>,
        message_id: String,
    },
}

impl ConversationRef {
    pub fn channel(id: impl Into<String>) -> Self {
        Self::Channel { id: id.into() }
    }

    /// The whisper shared by two participants, in either order.
    pub fn whisper(uid_a: &str, uid_b: &str) -> Self {
        Self::Whisper {
            id: build_conversation_id(uid_a, uid_b),
        }
    }

    pub fn thread(parent: ConversationRef, message_id: impl Into<String>) -> Self {
        Self::Thread {
            parent: Box::new(parent),
            message_id: message_id.into(),
        }
    }

    /// Storage path of the message collection.
    pub fn path(&self) -> String {
        match self {
            Self::Channel { id } => format!("channels/{id}/messages"),
            Self::Whisper { id } => format!("whispers/{id}/messages"),
            Self::Thread { parent, message_id } => format!("{}/{message_id}/thread", parent.path()),
        }
    }

    /// For a whisper, the participant that is not `my_uid`.
    pub fn whisper_partner<'a>(&'a self, my_uid: &str) -> Option<&'a str> {
        match self {
            Self::Whisper { id } => Some(resolve_partner(id, my_uid)),
            _ => None,
        }
    }

    /// The parent conversation and message when this is a thread.
    pub fn thread_parent(&self) -> Option<(&ConversationRef, &str)> {
        match self {
            Self::Thread { parent, message_id } => Some((parent.as_ref(), message_id.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
