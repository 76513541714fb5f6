//! Identity collaborator.
//!
//! The core never manages credentials; it only asks who the current
//! participant is.

/// Exposes the signed-in participant.
///
/// Implementations wrap whatever identity provider the client is built on.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current participant's stable identifier.
    fn current_uid(&self) -> String;

    /// Returns the current participant's display name.
    ///
    /// Stored on outgoing messages as the author name at authorship time.
    fn display_name(&self) -> String;
}

/// Identity fixed at construction time.
///
/// Suitable for tests, demos and clients that resolve the identity once at
/// sign-in.
///
/// # Example
///
/// ```
/// use murmur_core::user::{IdentityProvider, StaticIdentity};
///
/// let me = StaticIdentity::new("u-ann", "Ann");
/// assert_eq!(me.current_uid(), "u-ann");
/// ```
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    uid: String,
    name: String,
}

impl StaticIdentity {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_uid(&self) -> String {
        self.uid.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity::new("u-1", "Jordan");
        assert_eq!(identity.current_uid(), "u-1");
        assert_eq!(identity.display_name(), "Jordan");
    }
}
