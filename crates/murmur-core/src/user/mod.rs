//! Participant and channel directory module.
//!
//! # Module Structure
//!
//! - `model`: `Member` and `Channel` records as delivered by the data gateway
//! - `service`: `IdentityProvider` trait exposing the signed-in participant

mod model;
mod service;

// Re-export public API
pub use model::{Channel, Member};
pub use service::{IdentityProvider, StaticIdentity};
