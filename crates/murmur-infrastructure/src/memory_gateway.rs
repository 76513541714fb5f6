//! In-memory `ChatGateway` implementation.
//!
//! Keeps every conversation in process and publishes full snapshots through
//! `tokio::sync::watch`, which matches the live-stream contract: subscribers
//! always see the latest complete, ordered list. Used by tests and offline
//! sessions.

use async_trait::async_trait;
use murmur_core::conversation::ConversationRef;
use murmur_core::error::{ChatError, Result};
use murmur_core::gateway::{ChatGateway, MessageStream, SearchHit};
use murmur_core::message::{Message, OutgoingMessage, Reactions, apply_reaction};
use murmur_core::user::{Channel, Member};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

/// Messages of one conversation and the channel publishing them.
struct ConversationLog {
    messages: Vec<Message>,
    sender: watch::Sender<Vec<Message>>,
}

impl ConversationLog {
    fn new() -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self {
            messages: Vec::new(),
            sender,
        }
    }

    /// Inserts after every message with a timestamp <= the new one, so ties
    /// keep insertion order.
    fn insert(&mut self, message: Message) {
        let index = self
            .messages
            .partition_point(|m| m.timestamp <= message.timestamp);
        self.messages.insert(index, message);
    }

    fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.messages
            .last()
            .map_or(now, |last| now.max(last.timestamp))
    }

    fn message_mut(&mut self, message_id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }

    fn publish(&self) {
        self.sender.send_replace(self.messages.clone());
    }
}

/// A process-local data gateway.
///
/// # Example
///
/// ```
/// use murmur_infrastructure::InMemoryGateway;
/// use murmur_core::user::Member;
///
/// let gateway = InMemoryGateway::new()
///     .with_members(vec![Member::new("u-1", "Ann", "ann@example.com")]);
/// ```
pub struct InMemoryGateway {
    conversations: RwLock<HashMap<ConversationRef, ConversationLog>>,
    members: RwLock<Vec<Member>>,
    channels: RwLock<Vec<Channel>>,
    fail_writes: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            members: RwLock::new(Vec::new()),
            channels: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seeds the member directory.
    pub fn with_members(self, members: Vec<Member>) -> Self {
        Self {
            members: RwLock::new(members),
            ..self
        }
    }

    /// Seeds the channel directory.
    pub fn with_channels(self, channels: Vec<Channel>) -> Self {
        Self {
            channels: RwLock::new(channels),
            ..self
        }
    }

    /// Makes every subsequent write fail with a gateway error (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stores a message exactly as given, as if another session wrote it.
    pub async fn insert_message(&self, conversation: &ConversationRef, message: Message) {
        let mut conversations = self.conversations.write().await;
        let log = conversations
            .entry(conversation.clone())
            .or_insert_with(ConversationLog::new);
        log.insert(message);
        log.publish();
    }

    /// Current messages of a conversation, bypassing the stream.
    pub async fn messages(&self, conversation: &ConversationRef) -> Vec<Message> {
        self.conversations
            .read()
            .await
            .get(conversation)
            .map(|log| log.messages.clone())
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChatError::gateway("write rejected by store"));
        }
        Ok(())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatGateway for InMemoryGateway {
    async fn send_message(
        &self,
        conversation: &ConversationRef,
        payload: OutgoingMessage,
    ) -> Result<Message> {
        payload.validate()?;
        self.check_writable()?;

        let mut conversations = self.conversations.write().await;
        let log = conversations
            .entry(conversation.clone())
            .or_insert_with(ConversationLog::new);
        let message = Message {
            id: Uuid::new_v4().to_string(),
            text: payload.text,
            uid: payload.uid,
            user: payload.user,
            timestamp: log.next_timestamp(),
            reactions: Reactions::new(),
            edited: false,
            thread_count: 0,
        };
        log.insert(message.clone());
        log.publish();

        if let Some((parent, parent_id)) = conversation.thread_parent() {
            if let Some(parent_log) = conversations.get_mut(parent) {
                if let Some(parent_message) = parent_log.message_mut(parent_id) {
                    parent_message.thread_count += 1;
                    parent_log.publish();
                }
            }
        }

        tracing::debug!(conversation = %conversation, message_id = %message.id, "message stored");
        Ok(message)
    }

    async fn react_to_message(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        emoji: &str,
        add: bool,
        participant: &str,
    ) -> Result<()> {
        self.check_writable()?;

        let mut conversations = self.conversations.write().await;
        let log = conversations
            .get_mut(conversation)
            .ok_or_else(|| ChatError::not_found("conversation", conversation.path()))?;
        let message = log
            .message_mut(message_id)
            .ok_or_else(|| ChatError::not_found("message", message_id))?;
        message.reactions = apply_reaction(&message.reactions, emoji, participant, add);
        log.publish();

        tracing::debug!(conversation = %conversation, message_id, emoji, add, "reaction stored");
        Ok(())
    }

    async fn edit_message(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        editor_uid: &str,
        text: &str,
    ) -> Result<()> {
        if text.trim().is_empty() {
            return Err(ChatError::invalid_payload("edited text is empty"));
        }
        self.check_writable()?;

        let mut conversations = self.conversations.write().await;
        let log = conversations
            .get_mut(conversation)
            .ok_or_else(|| ChatError::not_found("conversation", conversation.path()))?;
        let message = log
            .message_mut(message_id)
            .ok_or_else(|| ChatError::not_found("message", message_id))?;
        if !message.is_authored_by(editor_uid) {
            return Err(ChatError::permission_denied(format!(
                "{editor_uid} cannot edit a message by {}",
                message.uid
            )));
        }
        message.text = text.to_string();
        message.edited = true;
        log.publish();
        Ok(())
    }

    async fn stream_messages(&self, conversation: &ConversationRef) -> Result<MessageStream> {
        let mut conversations = self.conversations.write().await;
        let log = conversations
            .entry(conversation.clone())
            .or_insert_with(ConversationLog::new);
        Ok(log.sender.subscribe())
    }

    async fn search_conversation(
        &self,
        conversation: &ConversationRef,
        term: &str,
    ) -> Result<Vec<Message>> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .get(conversation)
            .map(|log| {
                log.messages
                    .iter()
                    .filter(|m| m.contains_term(term))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search_across_conversations(
        &self,
        conversations: &[ConversationRef],
        term: &str,
    ) -> Result<Vec<SearchHit>> {
        let searches = conversations.iter().map(|conversation| async move {
            let messages = self.search_conversation(conversation, term).await?;
            Ok::<_, ChatError>(
                messages
                    .into_iter()
                    .map(|message| SearchHit {
                        conversation: conversation.clone(),
                        message,
                    })
                    .collect::<Vec<_>>(),
            )
        });
        let hits = futures::future::try_join_all(searches).await?;
        Ok(hits.into_iter().flatten().collect())
    }

    async fn list_members(&self) -> Result<Vec<Member>> {
        Ok(self.members.read().await.clone())
    }

    async fn list_channels(&self) -> Result<Vec<Channel>> {
        Ok(self.channels.read().await.clone())
    }
}
