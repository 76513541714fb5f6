//! Infrastructure layer for murmur.
//!
//! Concrete collaborators behind the core traits plus the ambient services:
//! configuration loading and tracing setup.

pub mod config_service;
pub mod logging;
pub mod memory_gateway;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::memory_gateway::InMemoryGateway;
pub use crate::paths::MurmurPaths;
