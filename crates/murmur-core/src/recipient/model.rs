//! Recipient models.

use serde::{Deserialize, Serialize};

use super::resolver::build_conversation_id;
use crate::conversation::ConversationRef;
use crate::user::{Channel, Member};

/// A broadcast or whisper target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Recipient {
    Channel {
        #[serde(rename = "channelId")]
        channel_id: String,
        name: String,
    },
    User {
        /// The partner's participant id
        #[serde(rename = "partnerChat")]
        partner_chat: String,
        name: String,
        mail: String,
        avatar: String,
    },
}

impl Recipient {
    /// The key deduplication runs on: channel id or partner id.
    pub fn identity_key(&self) -> &str {
        match self {
            Self::Channel { channel_id, .. } => channel_id,
            Self::User { partner_chat, .. } => partner_chat,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Channel { name, .. } | Self::User { name, .. } => name,
        }
    }

    /// Conversation a message to this recipient is written into.
    ///
    /// Users map to the whisper shared with `my_uid`.
    pub fn conversation_ref(&self, my_uid: &str) -> ConversationRef {
        match self {
            Self::Channel { channel_id, .. } => ConversationRef::channel(channel_id.clone()),
            Self::User { partner_chat, .. } => {
                ConversationRef::Whisper {
                    id: build_conversation_id(my_uid, partner_chat),
                }
            }
        }
    }
}

impl From<&Member> for Recipient {
    fn from(member: &Member) -> Self {
        Self::User {
            partner_chat: member.uid.clone(),
            name: member.name.clone(),
            mail: member.email.clone(),
            avatar: member.avatar.clone(),
        }
    }
}

impl From<&Channel> for Recipient {
    fn from(channel: &Channel) -> Self {
        Self::Channel {
            channel_id: channel.id.clone(),
            name: channel.name.clone(),
        }
    }
}

/// Ordered recipients with at most one entry per identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientSet(Vec<Recipient>);

impl RecipientSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `recipient` unless one with the same key is present.
    ///
    /// Returns true when it was added.
    pub fn insert(&mut self, recipient: Recipient) -> bool {
        if self.contains_key(recipient.identity_key()) {
            return false;
        }
        self.0.push(recipient);
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<Recipient> {
        let index = self.0.iter().position(|r| r.identity_key() == key)?;
        Some(self.0.remove(index))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|r| r.identity_key() == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipient> {
        self.0.iter()
    }

    /// Empties the set, returning its contents in insertion order.
    pub fn drain(&mut self) -> Vec<Recipient> {
        std::mem::take(&mut self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jordan() -> Member {
        Member::new("u-jordan", "Jordan", "jordan@example.com")
    }

    #[test]
    fn test_insert_deduplicates_by_key() {
        let mut set = RecipientSet::new();
        assert!(set.insert(Recipient::from(&jordan())));
        assert!(!set.insert(Recipient::from(&jordan())));
        assert!(set.insert(Recipient::from(&Channel::new("c-1", "general"))));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_and_drain() {
        let mut set = RecipientSet::new();
        set.insert(Recipient::from(&jordan()));
        set.insert(Recipient::from(&Channel::new("c-1", "general")));

        let removed = set.remove("u-jordan").unwrap();
        assert_eq!(removed.name(), "Jordan");
        assert!(set.remove("u-jordan").is_none());

        let drained = set.drain();
        assert_eq!(drained.len(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_user_recipient_maps_to_whisper() {
        let recipient = Recipient::from(&jordan());
        assert_eq!(
            recipient.conversation_ref("u-ann"),
            ConversationRef::Whisper {
                id: "u-ann_u-jordan".to_string()
            }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let recipient = Recipient::from(&Channel::new("c-1", "general"));
        let json = serde_json::to_value(&recipient).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "channel", "channelId": "c-1", "name": "general"})
        );

        let user: Recipient = serde_json::from_value(serde_json::json!({
            "type": "user",
            "partnerChat": "u-2",
            "name": "Bo",
            "mail": "bo@example.com",
            "avatar": ""
        }))
        .unwrap();
        assert_eq!(user.identity_key(), "u-2");
    }
}
