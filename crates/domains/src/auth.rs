//! Caller identity as seen by the command interpreter.

use crate::role::{level_of, Role};

/// Raw identity claims lifted off a request, before any verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    pub role: Option<String>,
    pub username: Option<String>,
}

/// Verified caller identity passed explicitly into every command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Role name as asserted by the identity source; may not be a tier
    pub role_name: String,
    pub username: Option<String>,
}

impl AuthContext {
    pub fn new(role_name: impl Into<String>, username: Option<String>) -> Self {
        Self {
            role_name: role_name.into(),
            username,
        }
    }

    /// Convenience for tests and tooling acting as a known tier.
    pub fn with_role(role: Role) -> Self {
        Self::new(role.as_str(), None)
    }

    /// Tier index of the caller, `-1` for unknown role names.
    pub fn level(&self) -> i32 {
        level_of(&self.role_name)
    }
}
