//! Board-wide rules fixed at startup.

use chrono::Duration;

/// Immutable posting policy injected into the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPolicy {
    /// Minimum time between two posts from the same username
    pub cooldown: Duration,
}

impl BoardPolicy {
    pub const DEFAULT_COOLDOWN_SECS: i64 = 5;

    /// `None` when `secs` is outside the range chrono can represent.
    pub fn with_cooldown_secs(secs: i64) -> Option<Self> {
        Duration::try_seconds(secs).map(|cooldown| Self { cooldown })
    }
}

impl Default for BoardPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::seconds(Self::DEFAULT_COOLDOWN_SECS),
        }
    }
}
