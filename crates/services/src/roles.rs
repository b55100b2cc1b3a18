//! Promotion and demotion rules.
//!
//! A change is always relative to the subject's current tier. The commander
//! may grant a tier at most one above their own and revoke down to at most
//! one below their own:
//!
//! * promote: `current < target` and not `target - 1 > commander`
//! * demote:  `target < current` and not `target + 1 < commander`

use std::fmt;

use domains::{AppError, Role};

/// Which way a role change moves the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Promote,
    Demote,
}

impl Direction {
    /// `+1` for promotion, `-1` for demotion.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Promote => 1,
            Direction::Demote => -1,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Direction::Promote => "promoted",
            Direction::Demote => "demoted",
        }
    }
}

/// An accepted transition, ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    pub from: Role,
    pub to: Role,
    pub direction: Direction,
}

impl fmt::Display for RoleChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Promotion target not above the current tier
    #[error("already holds {current}, which is equal to or higher than {target}")]
    AlreadyAtOrAbove { current: Role, target: Role },
    /// Demotion target not below the current tier
    #[error("already holds {current}, which is equal to or lower than {target}")]
    AlreadyAtOrBelow { current: Role, target: Role },
    /// Target lies outside the band the commander may grant or revoke
    #[error("{target} is outside the range a level {commander} commander may {verb}")]
    OutOfRange {
        target: Role,
        commander: i32,
        verb: &'static str,
    },
}

impl Rejection {
    /// Directional mistakes are bad requests; range violations are
    /// permission failures.
    pub fn into_app_error(self, username: &str) -> AppError {
        let msg = format!("cannot change role of \"{username}\": {self}");
        match self {
            Rejection::OutOfRange { .. } => AppError::PermissionDenied(msg),
            _ => AppError::Validation(msg),
        }
    }
}

/// Validates moving a subject from `current` to `target`.
///
/// `commander` is the level of whoever issued the command, `-1` when their
/// role name is not a tier. Nothing is mutated here.
pub fn plan_change(
    current: Role,
    target: Role,
    direction: Direction,
    commander: i32,
) -> Result<RoleChange, Rejection> {
    let (cur, tgt) = (current.level(), target.level());
    if (tgt - cur) * direction.sign() <= 0 {
        return Err(match direction {
            Direction::Promote => Rejection::AlreadyAtOrAbove { current, target },
            Direction::Demote => Rejection::AlreadyAtOrBelow { current, target },
        });
    }

    let (out_of_range, verb) = match direction {
        Direction::Promote => (tgt - 1 > commander, "grant"),
        Direction::Demote => (tgt + 1 < commander, "revoke down to"),
    };
    if out_of_range {
        return Err(Rejection::OutOfRange {
            target,
            commander,
            verb,
        });
    }

    Ok(RoleChange {
        from: current,
        to: target,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_succeeds_iff_above_current_and_within_one_of_commander() {
        for commander in -1..=5 {
            for current in Role::ALL {
                for target in Role::ALL {
                    let ok = plan_change(current, target, Direction::Promote, commander).is_ok();
                    let expected = current.level() < target.level()
                        && target.level() <= commander + 1;
                    assert_eq!(ok, expected, "{current} -> {target} by {commander}");
                }
            }
        }
    }

    #[test]
    fn demotion_succeeds_iff_below_current_and_within_one_of_commander() {
        for commander in -1..=5 {
            for current in Role::ALL {
                for target in Role::ALL {
                    let ok = plan_change(current, target, Direction::Demote, commander).is_ok();
                    let expected = target.level() < current.level()
                        && target.level() >= commander - 1;
                    assert_eq!(ok, expected, "{current} -> {target} by {commander}");
                }
            }
        }
    }

    #[test]
    fn summit_boundaries() {
        let summit = Role::Summit.level();
        assert!(plan_change(Role::Base, Role::Moderator, Direction::Promote, summit).is_ok());
        // 5 - 1 = 4 is not greater than 4
        assert!(plan_change(Role::Base, Role::Operator, Direction::Promote, summit).is_ok());
        assert_eq!(
            plan_change(Role::Base, Role::Operator, Direction::Promote, Role::Moderator.level()),
            Err(Rejection::OutOfRange {
                target: Role::Operator,
                commander: 3,
                verb: "grant",
            })
        );
        // 1 + 1 = 2 is below 4
        assert!(matches!(
            plan_change(Role::Operator, Role::Speaker, Direction::Demote, summit),
            Err(Rejection::OutOfRange { .. })
        ));
        assert!(plan_change(Role::Operator, Role::Moderator, Direction::Demote, summit).is_ok());
    }

    #[test]
    fn rejection_maps_to_status_family() {
        let same = plan_change(Role::Manager, Role::Manager, Direction::Promote, 5).unwrap_err();
        assert!(matches!(same.into_app_error("bob"), AppError::Validation(_)));

        let far = plan_change(Role::Base, Role::Operator, Direction::Promote, 2).unwrap_err();
        let err = far.into_app_error("bob");
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert!(err.to_string().contains("\"bob\""));
    }
}
