use domains::{AppError, AuthContext, IdentityProvider, RequestCredentials, Result};
use tracing::debug;

/// Takes the caller's role and username straight from request headers.
///
/// Stand-in until a real identity source exists. Fails closed: a request
/// with no role claim is rejected instead of being treated as the lowest
/// tier. A role claim that is not a tier name is passed through and ends up
/// at level `-1`, which every gate denies.
#[derive(Debug, Clone, Default)]
pub struct TrustedHeaderIdentity;

impl IdentityProvider for TrustedHeaderIdentity {
    fn authenticate(&self, credentials: &RequestCredentials) -> Result<AuthContext> {
        let role = credentials
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("no caller role supplied".into()))?;

        let username = credentials
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(String::from);

        debug!(role, username = ?username, "caller identified by trusted header");
        Ok(AuthContext::new(role, username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::Role;

    fn creds(role: Option<&str>, username: Option<&str>) -> RequestCredentials {
        RequestCredentials {
            role: role.map(String::from),
            username: username.map(String::from),
        }
    }

    #[test]
    fn missing_or_blank_role_fails_closed() {
        for role in [None, Some(""), Some("   ")] {
            let err = TrustedHeaderIdentity
                .authenticate(&creds(role, Some("alice")))
                .unwrap_err();
            assert!(matches!(err, AppError::Unauthenticated(_)));
        }
    }

    #[test]
    fn role_and_name_carry_through() {
        let ctx = TrustedHeaderIdentity
            .authenticate(&creds(Some("summit"), Some("carol")))
            .unwrap();
        assert_eq!(ctx.level(), Role::Summit.level());
        assert_eq!(ctx.username.as_deref(), Some("carol"));
    }

    #[test]
    fn unknown_role_is_kept_at_level_minus_one() {
        let ctx = TrustedHeaderIdentity
            .authenticate(&creds(Some("root"), None))
            .unwrap();
        assert_eq!(ctx.level(), -1);
        assert_eq!(ctx.username, None);
    }
}
