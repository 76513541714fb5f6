//! ChatUseCase - coordinates one client session against the data gateway.
//!
//! Local state is a cache of message lists keyed by conversation. Reactions
//! and edits are applied to the cache first and written to the gateway in a
//! spawned task. Writes touching the same message run one after another in
//! the order they were issued. A failed write is logged and reported through
//! the error callback but never rolled back; the next snapshot from the live
//! stream overwrites the cache either way.

use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use murmur_core::config::ComposerSettings;
use murmur_core::conversation::ConversationRef;
use murmur_core::emoji::{reaction_shortcut, to_emoji};
use murmur_core::error::{ChatError, Result};
use murmur_core::gateway::{ChatGateway, SearchHit};
use murmur_core::mention::{Markup, Trigger, linkify, mentioned_uids};
use murmur_core::message::{Message, OutgoingMessage, apply_reaction};
use murmur_core::recipient::{
    Recipient, RecipientSet, SearchIntent, filter_candidates, search_candidates,
};
use murmur_core::user::{Channel, IdentityProvider, Member};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::composer::{ComposerState, MentionCandidate};

/// Callback invoked when a background write fails.
///
/// Used to notify the UI (e.g. show a toast).
pub type WriteErrorCallback = Arc<dyn Fn(ChatError) + Send + Sync>;

type MessageCache = Arc<RwLock<HashMap<ConversationRef, Vec<Message>>>>;

/// Latest remote write per message; the next write to the same message awaits it.
type PendingWrite = Shared<BoxFuture<'static, ()>>;
type WriteChains = HashMap<(ConversationRef, String), PendingWrite>;

/// Members and channels known to this session.
#[derive(Debug, Clone, Default)]
struct Directory {
    members: Vec<Member>,
    channels: Vec<Channel>,
}

/// A message ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub message: Message,
    pub markup: Markup,
    /// Written by the current participant
    pub mine: bool,
}

/// A message the gateway accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub conversation: ConversationRef,
    pub message: Message,
    /// Known members mentioned in the text, for notification
    pub mentioned_uids: Vec<String>,
}

/// Result of sending to one broadcast recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastOutcome {
    pub recipient: Recipient,
    pub result: Result<Delivery>,
}

/// What a composer submission produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Direct(Delivery),
    Broadcast(Vec<BroadcastOutcome>),
}

/// Recipient search results, detached from the directory lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientCandidates {
    pub intent: SearchIntent,
    pub members: Vec<Member>,
    pub channels: Vec<Channel>,
}

pub struct ChatUseCase {
    gateway: Arc<dyn ChatGateway>,
    identity: Arc<dyn IdentityProvider>,
    settings: ComposerSettings,
    cache: MessageCache,
    directory: RwLock<Directory>,
    subscriptions: Mutex<HashMap<ConversationRef, JoinHandle<()>>>,
    write_chains: Mutex<WriteChains>,
    write_error_callback: RwLock<Option<WriteErrorCallback>>,
}

impl ChatUseCase {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        identity: Arc<dyn IdentityProvider>,
        settings: ComposerSettings,
    ) -> Self {
        Self {
            gateway,
            identity,
            settings,
            cache: Arc::new(RwLock::new(HashMap::new())),
            directory: RwLock::new(Directory::default()),
            subscriptions: Mutex::new(HashMap::new()),
            write_chains: Mutex::new(HashMap::new()),
            write_error_callback: RwLock::new(None),
        }
    }

    /// Sets a callback to be invoked when a background write fails.
    pub async fn set_write_error_callback(&self, callback: WriteErrorCallback) {
        *self.write_error_callback.write().await = Some(callback);
    }

    /// Reloads members and channels from the gateway.
    pub async fn refresh_directory(&self) -> Result<()> {
        let (members, channels) =
            futures::try_join!(self.gateway.list_members(), self.gateway.list_channels())?;
        tracing::debug!(
            "Directory refreshed: {} members, {} channels",
            members.len(),
            channels.len()
        );
        *self.directory.write().await = Directory { members, channels };
        Ok(())
    }

    pub async fn members(&self) -> Vec<Member> {
        self.directory.read().await.members.clone()
    }

    pub async fn channels(&self) -> Vec<Channel> {
        self.directory.read().await.channels.clone()
    }

    // ============================================================================
    // Live stream
    // ============================================================================

    /// Starts mirroring a conversation's live stream into the cache.
    ///
    /// The current snapshot is applied before this returns. Subscribing
    /// again replaces the previous subscription.
    pub async fn subscribe(&self, conversation: &ConversationRef) -> Result<()> {
        let mut stream = self.gateway.stream_messages(conversation).await?;
        let initial = stream.borrow_and_update().clone();
        self.apply_snapshot(conversation, initial).await;

        let cache = Arc::clone(&self.cache);
        let key = conversation.clone();
        let handle = tokio::spawn(async move {
            while stream.changed().await.is_ok() {
                let snapshot = stream.borrow_and_update().clone();
                tracing::trace!(conversation = %key, "snapshot of {} messages", snapshot.len());
                cache.write().await.insert(key.clone(), snapshot);
            }
            tracing::debug!(conversation = %key, "Message stream closed");
        });

        let previous = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conversation.clone(), handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        tracing::info!(conversation = %conversation, "Subscribed");
        Ok(())
    }

    /// Stops mirroring a conversation. Cached messages are kept.
    pub fn unsubscribe(&self, conversation: &ConversationRef) {
        let handle = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(conversation);
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    /// Replaces the cached messages of a conversation with an authoritative snapshot.
    pub async fn apply_snapshot(&self, conversation: &ConversationRef, messages: Vec<Message>) {
        self.cache
            .write()
            .await
            .insert(conversation.clone(), messages);
    }

    pub async fn messages(&self, conversation: &ConversationRef) -> Vec<Message> {
        self.cache
            .read()
            .await
            .get(conversation)
            .cloned()
            .unwrap_or_default()
    }

    /// Cached messages with their text linkified against the directory.
    pub async fn render(&self, conversation: &ConversationRef) -> Vec<RenderedMessage> {
        let me = self.identity.current_uid();
        let messages = self.messages(conversation).await;
        let directory = self.directory.read().await;
        messages
            .into_iter()
            .map(|message| RenderedMessage {
                markup: linkify(&message.text, &directory.members, &directory.channels),
                mine: message.is_authored_by(&me),
                message,
            })
            .collect()
    }

    // ============================================================================
    // Optimistic mutations
    // ============================================================================

    /// Toggles the current participant's reaction on a cached message.
    ///
    /// The cache is updated immediately; the returned handle resolves once
    /// the remote write has finished (successfully or not). Writes to the
    /// same message reach the gateway in the order they were issued.
    pub async fn toggle_reaction(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        emoji: &str,
    ) -> Result<JoinHandle<()>> {
        let emoji = reaction_shortcut(emoji);
        if emoji.is_empty() {
            return Err(ChatError::invalid_payload("reaction emoji is empty"));
        }
        let me = self.identity.current_uid();
        let callback = self.write_error_callback.read().await.clone();

        // Queued while the cache lock is held: remote order follows local order.
        let mut cache = self.cache.write().await;
        let message = find_message(&mut cache, conversation, message_id)?;
        let add = !message.reactions.has_reacted(&emoji, &me);
        message.reactions = apply_reaction(&message.reactions, &emoji, &me, add);
        tracing::debug!(conversation = %conversation, message_id, emoji = %emoji, add, "Reaction applied locally");

        let gateway = Arc::clone(&self.gateway);
        let target = conversation.clone();
        let id = message_id.to_string();
        let handle = self.enqueue_write(conversation, message_id, "reaction", callback, async move {
            gateway
                .react_to_message(&target, &id, &emoji, add, &me)
                .await
        });
        drop(cache);
        Ok(handle)
    }

    /// Replaces the text of one of the current participant's messages.
    pub async fn edit_message(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        text: &str,
    ) -> Result<JoinHandle<()>> {
        if text.trim().is_empty() {
            return Err(ChatError::invalid_payload("edited text is empty"));
        }
        let me = self.identity.current_uid();
        let callback = self.write_error_callback.read().await.clone();

        let mut cache = self.cache.write().await;
        let message = find_message(&mut cache, conversation, message_id)?;
        if !message.is_authored_by(&me) {
            return Err(ChatError::permission_denied(format!(
                "{me} cannot edit a message by {}",
                message.uid
            )));
        }
        message.text = text.to_string();
        message.edited = true;

        let gateway = Arc::clone(&self.gateway);
        let target = conversation.clone();
        let id = message_id.to_string();
        let text = text.to_string();
        let handle = self.enqueue_write(conversation, message_id, "edit", callback, async move {
            gateway.edit_message(&target, &id, &me, &text).await
        });
        drop(cache);
        Ok(handle)
    }

    /// Spawns `write` behind the previous pending write to the same message.
    fn enqueue_write<F>(
        &self,
        conversation: &ConversationRef,
        message_id: &str,
        kind: &'static str,
        callback: Option<WriteErrorCallback>,
        write: F,
    ) -> JoinHandle<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let mut chains = self
            .write_chains
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        chains.retain(|_, pending| pending.peek().is_none());

        let key = (conversation.clone(), message_id.to_string());
        let previous = chains.get(&key).cloned();
        let pending = async move {
            if let Some(previous) = previous {
                previous.await;
            }
            if let Err(e) = write.await {
                tracing::warn!(target: "chat_sync", "Remote {} write failed: {}", kind, e);
                if let Some(callback) = callback {
                    callback(e);
                }
            }
        }
        .boxed()
        .shared();
        chains.insert(key, pending.clone());
        tokio::spawn(pending)
    }

    // ============================================================================
    // Sending
    // ============================================================================

    /// Sends `text` as the current participant.
    pub async fn send(&self, conversation: &ConversationRef, text: &str) -> Result<Delivery> {
        let text = if self.settings.normalize_emoji_on_send {
            to_emoji(text)
        } else {
            text.to_string()
        };
        let payload = OutgoingMessage::new(
            text,
            self.identity.current_uid(),
            self.identity.display_name(),
        );
        let message = self.gateway.send_message(conversation, payload).await?;
        let mentioned_uids = mentioned_uids(&message.text, &self.directory.read().await.members);

        tracing::debug!(conversation = %conversation, message_id = %message.id, "Message sent");
        Ok(Delivery {
            conversation: conversation.clone(),
            message,
            mentioned_uids,
        })
    }

    /// Sends the same text to every recipient concurrently.
    ///
    /// Users receive it in the whisper shared with the current participant.
    /// One failing recipient does not stop the others; outcomes keep the
    /// order of `recipients`.
    pub async fn broadcast(&self, recipients: &[Recipient], text: &str) -> Vec<BroadcastOutcome> {
        let me = self.identity.current_uid();
        let sends = recipients.iter().map(|recipient| {
            let conversation = recipient.conversation_ref(&me);
            async move {
                let result = self.send(&conversation, text).await;
                if let Err(e) = &result {
                    tracing::warn!("Broadcast to {} failed: {}", recipient.name(), e);
                }
                BroadcastOutcome {
                    recipient: recipient.clone(),
                    result,
                }
            }
        });
        join_all(sends).await
    }

    /// Sends whatever the composer holds and resets it.
    ///
    /// Goes to the selected recipients when there are any, otherwise to
    /// `current`. Returns `None` when the composer text is blank.
    pub async fn submit(
        &self,
        current: &ConversationRef,
        composer: &mut ComposerState,
    ) -> Result<Option<Submission>> {
        let Some(draft) = composer.take_outgoing(self.settings.normalize_emoji_on_send) else {
            return Ok(None);
        };
        if draft.recipients.is_empty() {
            let delivery = self.send(current, &draft.text).await?;
            return Ok(Some(Submission::Direct(delivery)));
        }
        let outcomes = self.broadcast(&draft.recipients, &draft.text).await;
        Ok(Some(Submission::Broadcast(outcomes)))
    }

    // ============================================================================
    // Search & candidates
    // ============================================================================

    pub async fn search(&self, conversation: &ConversationRef, term: &str) -> Result<Vec<Message>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.gateway.search_conversation(conversation, term).await
    }

    /// Searches every conversation this session has loaded.
    pub async fn search_everywhere(&self, term: &str) -> Result<Vec<SearchHit>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let conversations: Vec<ConversationRef> = self.cache.read().await.keys().cloned().collect();
        self.gateway
            .search_across_conversations(&conversations, term)
            .await
    }

    /// Completions for the mention being typed in `composer`.
    ///
    /// Empty when no mention is active. Capped at the configured limit.
    pub async fn mention_candidates(&self, composer: &ComposerState) -> Vec<MentionCandidate> {
        let Some(active) = composer.active_mention else {
            return Vec::new();
        };
        let directory = self.directory.read().await;
        let none = RecipientSet::new();
        let limit = self.settings.candidate_limit;
        match active.trigger {
            Trigger::User => filter_candidates(
                &directory.members,
                &composer.mention_query,
                SearchIntent::User,
                &none,
            )
            .into_iter()
            .take(limit)
            .map(|member| MentionCandidate::Member(member.clone()))
            .collect(),
            Trigger::Channel => filter_candidates(
                &directory.channels,
                &composer.mention_query,
                SearchIntent::Channel,
                &none,
            )
            .into_iter()
            .take(limit)
            .map(|channel| MentionCandidate::Channel(channel.clone()))
            .collect(),
        }
    }

    /// Runs a recipient search box value, excluding recipients already selected.
    pub async fn recipient_candidates(
        &self,
        input: &str,
        selected: &RecipientSet,
    ) -> RecipientCandidates {
        let directory = self.directory.read().await;
        let results = search_candidates(input, &directory.members, &directory.channels, selected);
        RecipientCandidates {
            intent: results.intent,
            members: results.members.into_iter().cloned().collect(),
            channels: results.channels.into_iter().cloned().collect(),
        }
    }
}

impl Drop for ChatUseCase {
    fn drop(&mut self) {
        let subscriptions = self
            .subscriptions
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in subscriptions.drain() {
            handle.abort();
        }
    }
}

fn find_message<'a>(
    cache: &'a mut HashMap<ConversationRef, Vec<Message>>,
    conversation: &ConversationRef,
    message_id: &str,
) -> Result<&'a mut Message> {
    cache
        .get_mut(conversation)
        .and_then(|messages| messages.iter_mut().find(|m| m.id == message_id))
        .ok_or_else(|| ChatError::not_found("message", message_id))
}
