//! Chat gateway trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::conversation::ConversationRef;
use crate::error::Result;
use crate::message::{Message, OutgoingMessage};
use crate::user::{Channel, Member};

/// Live view of one conversation.
///
/// Each value is a complete snapshot ordered by ascending timestamp (ties in
/// insertion order). Snapshots are authoritative: a consumer replaces its
/// local copy with every one it receives.
pub type MessageStream = watch::Receiver<Vec<Message>>;

/// A search match tagged with the conversation it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub conversation: ConversationRef,
    pub message: Message,
}

/// An abstract gateway to the managed document store.
///
/// Decouples the application layer from the concrete backend. Implementations
/// validate payloads at this boundary so everything past it can rely on the
/// entity shapes.
///
/// # Implementation Notes
///
/// - `react_to_message` must apply the same add/remove semantics as
///   [`crate::message::apply_reaction`], including deleting emptied keys.
/// - `stream_messages` restarts from a full snapshot on reconnect.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Persists a new message and returns it as stored (id and timestamp assigned).
    async fn send_message(
        &self,
        conversation: &ConversationRef,
        payload: OutgoingMessage,
    ) -> Result<Message>;

    /// Adds or removes one participant's reaction.
    async fn react_to_message(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        emoji: &str,
        add: bool,
        participant: &str,
    ) -> Result<()>;

    /// Replaces a message's text.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` when `editor_uid` is not the author
    /// - `NotFound` when the message does not exist
    async fn edit_message(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        editor_uid: &str,
        text: &str,
    ) -> Result<()>;

    /// Subscribes to the live message list of a conversation.
    async fn stream_messages(&self, conversation: &ConversationRef) -> Result<MessageStream>;

    /// Messages whose text contains `term` (case-insensitive).
    async fn search_conversation(
        &self,
        conversation: &ConversationRef,
        term: &str,
    ) -> Result<Vec<Message>>;

    /// Runs [`ChatGateway::search_conversation`] over several conversations.
    async fn search_across_conversations(
        &self,
        conversations: &[ConversationRef],
        term: &str,
    ) -> Result<Vec<SearchHit>>;

    /// Every member of the workspace.
    async fn list_members(&self) -> Result<Vec<Member>>;

    /// Every channel of the workspace.
    async fn list_channels(&self) -> Result<Vec<Channel>>;
}
