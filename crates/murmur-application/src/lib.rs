//! Application layer for murmur.
//!
//! - [`ChatUseCase`]: one client session over a [`murmur_core::gateway::ChatGateway`]
//! - [`ComposerState`]: the message composer and its mention tracking
//! - [`ViewState`]: overlays, editing, threads and UI effect requests

pub mod chat_usecase;
pub mod composer;
pub mod view_state;

pub use chat_usecase::{
    BroadcastOutcome, ChatUseCase, Delivery, RecipientCandidates, RenderedMessage, Submission,
    WriteErrorCallback,
};
pub use composer::{ComposerState, MentionCandidate, OutgoingDraft};
pub use view_state::{EditDraft, FocusRequest, Overlay, ScrollRequest, ViewEffects, ViewState};
