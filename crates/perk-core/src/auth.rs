//! Resolution of the calling user's identity.

use perk_domain::UserId;

use crate::CoreError;

/// Source of the current user's identity, e.g. a session or token verifier.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// Provider returning a fixed identity, or none for signed-out sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticAuth(pub Option<UserId>);

impl StaticAuth {
    pub fn signed_in(user: UserId) -> Self {
        Self(Some(user))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<UserId> {
        self.0
    }
}

/// Resolves the caller or fails with [`CoreError::Unauthenticated`].
pub fn require_user(auth: &dyn AuthProvider) -> Result<UserId, CoreError> {
    auth.current_user().ok_or(CoreError::Unauthenticated)
}
