//! Conversation view state.
//!
//! Transitions consume the state and return the next one. Effects the UI
//! must perform (scrolling, focusing) are queued as requests and drained
//! with [`ViewState::take_effects`].

use murmur_core::message::Message;
use serde::{Deserialize, Serialize};

/// At most one overlay is open at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Overlay {
    #[default]
    None,
    /// `message_id` is `None` when picking an emoji for the composer
    EmojiPicker { message_id: Option<String> },
    Search { term: String },
    Recipients,
}

/// An in-progress edit of one of the user's own messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDraft {
    pub message_id: String,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum ScrollRequest {
    Bottom,
    Message(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusRequest {
    Composer,
    EditBox,
    SearchBox,
}

/// Pending UI effects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewEffects {
    pub scroll: Option<ScrollRequest>,
    pub focus: Option<FocusRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub overlay: Overlay,
    pub editing: Option<EditDraft>,
    /// Id of the message whose thread is open
    pub open_thread: Option<String>,
    #[serde(skip)]
    pub scroll_request: Option<ScrollRequest>,
    #[serde(skip)]
    pub focus_request: Option<FocusRequest>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_emoji_picker(self, message_id: Option<String>) -> Self {
        Self {
            overlay: Overlay::EmojiPicker { message_id },
            ..self
        }
    }

    pub fn open_search(self) -> Self {
        Self {
            overlay: Overlay::Search {
                term: String::new(),
            },
            focus_request: Some(FocusRequest::SearchBox),
            ..self
        }
    }

    /// Updates the search term; ignored unless search is open.
    pub fn update_search(self, term: impl Into<String>) -> Self {
        match self.overlay {
            Overlay::Search { .. } => Self {
                overlay: Overlay::Search { term: term.into() },
                ..self
            },
            _ => self,
        }
    }

    pub fn open_recipients(self) -> Self {
        Self {
            overlay: Overlay::Recipients,
            ..self
        }
    }

    pub fn close_overlay(self) -> Self {
        Self {
            overlay: Overlay::None,
            focus_request: Some(FocusRequest::Composer),
            ..self
        }
    }

    /// Starts editing `message` when `my_uid` wrote it.
    ///
    /// Messages by other members leave the state unchanged. Starting an
    /// edit replaces any edit already in progress.
    pub fn start_edit(self, message: &Message, my_uid: &str) -> Self {
        if !message.is_authored_by(my_uid) {
            return self;
        }
        Self {
            editing: Some(EditDraft {
                message_id: message.id.clone(),
                draft: message.text.clone(),
            }),
            overlay: Overlay::None,
            focus_request: Some(FocusRequest::EditBox),
            ..self
        }
    }

    pub fn update_draft(self, draft: impl Into<String>) -> Self {
        let editing = self.editing.map(|edit| EditDraft {
            draft: draft.into(),
            ..edit
        });
        Self { editing, ..self }
    }

    /// Ends the edit and hands back the draft to commit.
    pub fn finish_edit(mut self) -> (Self, Option<EditDraft>) {
        let draft = self.editing.take();
        self.focus_request = Some(FocusRequest::Composer);
        (self, draft)
    }

    pub fn cancel_edit(self) -> Self {
        Self {
            editing: None,
            focus_request: Some(FocusRequest::Composer),
            ..self
        }
    }

    pub fn open_thread(self, message_id: impl Into<String>) -> Self {
        Self {
            open_thread: Some(message_id.into()),
            ..self
        }
    }

    pub fn close_thread(self) -> Self {
        Self {
            open_thread: None,
            ..self
        }
    }

    pub fn scroll_to_bottom(self) -> Self {
        Self {
            scroll_request: Some(ScrollRequest::Bottom),
            ..self
        }
    }

    /// Scrolls to a message, e.g. a search hit, and closes the overlay.
    pub fn jump_to(self, message_id: impl Into<String>) -> Self {
        Self {
            overlay: Overlay::None,
            scroll_request: Some(ScrollRequest::Message(message_id.into())),
            ..self
        }
    }

    /// Drains queued scroll and focus requests.
    pub fn take_effects(self) -> (Self, ViewEffects) {
        let effects = ViewEffects {
            scroll: self.scroll_request.clone(),
            focus: self.focus_request,
        };
        let next = Self {
            scroll_request: None,
            focus_request: None,
            ..self
        };
        (next, effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::message::Reactions;

    fn message(id: &str, uid: &str) -> Message {
        Message {
            id: id.to_string(),
            text: "original".to_string(),
            uid: uid.to_string(),
            user: "Ann".to_string(),
            timestamp: 1,
            reactions: Reactions::new(),
            edited: false,
            thread_count: 0,
        }
    }

    #[test]
    fn test_only_one_overlay_at_a_time() {
        let state = ViewState::new()
            .open_emoji_picker(Some("m-1".to_string()))
            .open_search();
        assert_eq!(
            state.overlay,
            Overlay::Search {
                term: String::new()
            }
        );
        let state = state.update_search("deploy").close_overlay();
        assert_eq!(state.overlay, Overlay::None);
    }

    #[test]
    fn test_update_search_requires_open_search() {
        let state = ViewState::new().open_recipients().update_search("x");
        assert_eq!(state.overlay, Overlay::Recipients);
    }

    #[test]
    fn test_edit_lifecycle() {
        let state = ViewState::new()
            .start_edit(&message("m-1", "u-1"), "u-1")
            .update_draft("fixed");
        let (state, draft) = state.finish_edit();
        assert_eq!(
            draft,
            Some(EditDraft {
                message_id: "m-1".to_string(),
                draft: "fixed".to_string()
            })
        );
        assert!(state.editing.is_none());
    }

    #[test]
    fn test_cannot_edit_someone_elses_message() {
        let state = ViewState::new().start_edit(&message("m-1", "u-2"), "u-1");
        assert!(state.editing.is_none());
        assert!(state.focus_request.is_none());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let state = ViewState::new()
            .start_edit(&message("m-1", "u-1"), "u-1")
            .update_draft("nope")
            .cancel_edit();
        let (_, draft) = state.finish_edit();
        assert!(draft.is_none());
    }

    #[test]
    fn test_effects_are_drained_once() {
        let state = ViewState::new().open_search().jump_to("m-9");
        let (state, effects) = state.take_effects();
        assert_eq!(effects.scroll, Some(ScrollRequest::Message("m-9".to_string())));
        assert_eq!(effects.focus, Some(FocusRequest::SearchBox));
        assert_eq!(state.overlay, Overlay::None);

        let (_, again) = state.take_effects();
        assert_eq!(again, ViewEffects::default());
    }

    #[test]
    fn test_thread_toggle() {
        let state = ViewState::new().open_thread("m-1");
        assert_eq!(state.open_thread.as_deref(), Some("m-1"));
        assert!(state.close_thread().open_thread.is_none());
    }

    #[test]
    fn test_serialized_state_omits_pending_effects() {
        let state = ViewState::new()
            .open_emoji_picker(None)
            .scroll_to_bottom();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["overlay"], serde_json::json!({"kind": "emojiPicker", "message_id": null}));
        assert!(json.get("scroll_request").is_none());

        let restored: ViewState = serde_json::from_value(json).unwrap();
        assert!(restored.scroll_request.is_none());
    }
}
