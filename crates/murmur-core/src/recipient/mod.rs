//! Recipients and search resolution.
//!
//! # Module Structure
//!
//! - `model`: broadcast/whisper targets and the deduplicating recipient set
//! - `resolver`: conversation ids, search-intent classification and candidate filtering

mod model;
mod resolver;

pub use model::{Recipient, RecipientSet};
pub use resolver::{
    Candidate, CandidateResults, SearchIntent, build_conversation_id, classify_input,
    filter_candidates, resolve_partner, search_candidates,
};
