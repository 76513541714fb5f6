//! Core domain layer for murmur.
//!
//! Pure, synchronous building blocks of the chat client plus the collaborator
//! traits the application layer drives:
//!
//! - [`mention`]: in-progress mention parsing and message linkification
//! - [`recipient`]: whisper ids, search intent and candidate filtering
//! - [`message`]: stored messages and the reaction reducer
//! - [`emoji`]: emoticon normalization
//! - [`gateway`] and [`user`]: data store and identity contracts

pub mod config;
pub mod conversation;
pub mod emoji;
pub mod error;
pub mod gateway;
pub mod mention;
pub mod message;
pub mod recipient;
pub mod user;

// Re-export common error type
pub use error::{ChatError, Result};
