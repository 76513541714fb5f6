//! Member and channel records.
//!
//! These are the shapes validated at the gateway boundary; the pure core
//! never guards against missing fields.

use serde::{Deserialize, Serialize};

/// A participant known to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable participant identifier issued by the identity provider
    pub uid: String,
    /// Display name, also the text matched by `@` mentions
    pub name: String,
    /// Email address, matched by free-text recipient search
    pub email: String,
    /// Avatar URL, empty when the member has none
    #[serde(default)]
    pub avatar: String,
}

impl Member {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            email: email.into(),
            avatar: String::new(),
        }
    }

    /// Sets the avatar URL.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }
}

/// A named channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    /// Channel name without the leading `#`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}
