//! # Role hierarchy
//!
//! Six ordered tiers. A tier is only ever compared by its position in
//! [`Role::ALL`]; names that are not a tier resolve to level `-1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level assigned to any role name that is not one of the six tiers.
pub const UNKNOWN_LEVEL: i32 = -1;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Base,
    Speaker,
    Manager,
    Moderator,
    Summit,
    Operator,
}

impl Role {
    /// Lowest to highest.
    pub const ALL: [Role; 6] = [
        Role::Base,
        Role::Speaker,
        Role::Manager,
        Role::Moderator,
        Role::Summit,
        Role::Operator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Base => "base",
            Role::Speaker => "speaker",
            Role::Manager => "manager",
            Role::Moderator => "moderator",
            Role::Summit => "summit",
            Role::Operator => "operator",
        }
    }

    /// Position of the tier in the hierarchy, `0` for [`Role::Base`].
    pub fn level(self) -> i32 {
        Role::ALL
            .iter()
            .position(|r| *r == self)
            .map_or(UNKNOWN_LEVEL, |i| i as i32)
    }

    /// Resolves an exact, case-sensitive tier name.
    pub fn from_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

/// Level of an arbitrary role name; unknown or empty names are `-1`.
pub fn level_of(name: &str) -> i32 {
    Role::from_name(name).map_or(UNKNOWN_LEVEL, Role::level)
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}
