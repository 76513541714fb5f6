//! Data gateway collaborator.
//!
//! Persistence, real-time sync and search live in an external document
//! store. This module defines the narrow contract the rest of murmur
//! talks to.

mod repository;

pub use repository::{ChatGateway, MessageStream, SearchHit};
