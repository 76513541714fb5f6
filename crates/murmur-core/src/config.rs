//! Client configuration model.
//!
//! Loaded from `config.toml` by the infrastructure `ConfigService`. Every
//! section has defaults, so a missing or partial file is valid.

use serde::{Deserialize, Serialize};

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    pub composer: ComposerSettings,
    pub reactions: ReactionSettings,
    pub logging: LogSettings,
}

/// Composer behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    /// Maximum number of mention candidates offered at once
    pub candidate_limit: usize,
    /// Convert emoticons to emoji when sending
    pub normalize_emoji_on_send: bool,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            candidate_limit: 8,
            normalize_emoji_on_send: true,
        }
    }
}

/// Reaction picker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionSettings {
    /// Quick reactions shown first; emoticon shortcuts such as `+1` are accepted
    pub quick: Vec<String>,
}

impl Default for ReactionSettings {
    fn default() -> Self {
        Self {
            quick: ["👍", "❤️", "😂", "😮", "😢", "🎉"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, e.g. `info` or `murmur_application=debug`
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RootConfig {
    /// Quick reactions with emoticon shortcuts resolved to glyphs.
    pub fn quick_reactions(&self) -> Vec<String> {
        self.reactions
            .quick
            .iter()
            .map(|r| crate::emoji::reaction_shortcut(r))
            .collect()
    }
}
