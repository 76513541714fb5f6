//! Message domain module.
//!
//! - `model`: stored messages and outgoing payloads
//! - `reaction`: the emoji → participants map and its reducer

mod model;
mod reaction;

pub use model::{Message, OutgoingMessage};
pub use reaction::{Reactions, apply_reaction};
