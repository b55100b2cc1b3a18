//! Minimum-tier check run before every guarded action.

use domains::{AppError, AuthContext, Result, Role};

/// Grants access iff the caller's tier index is at least `min`'s.
///
/// Unknown role names sit at `-1`, below every tier.
pub fn authorize(ctx: &AuthContext, min: Role) -> Result<()> {
    if ctx.level() >= min.level() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "insufficient permission: {min} or higher is required"
        )))
    }
}
