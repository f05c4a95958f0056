//! Draft configuration and the session phase machine.

use std::fmt;
use std::time::Duration;

use draftforge_tick::{ClockConfig, TickerConfig};

// ---------------------------------------------------------------------------
// DraftConfig
// ---------------------------------------------------------------------------

/// Settings shared by every session a [`DraftManager`](crate::DraftManager)
/// creates.
#[derive(Debug, Clone)]
pub struct DraftConfig {
    /// Turn countdown, starting reserve and reserve floor.
    pub clock: ClockConfig,

    /// How long a finished session stays joinable for review.
    pub finished_retention: Duration,

    /// How long a session with nobody connected survives without activity.
    pub idle_window: Duration,

    /// Period of the reaper sweep.
    pub sweep_interval: Duration,

    /// Governor tick schedule.
    pub ticker: TickerConfig,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            finished_retention: Duration::from_secs(600),
            idle_window: Duration::from_secs(1800),
            sweep_interval: Duration::from_secs(30),
            ticker: TickerConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
///
/// ```text
/// Lobby ──→ Immunity ──→ Main ──→ Finished
///   └──────────────────→─┘
/// ```
///
/// - **Lobby**: waiting for both sides to be seated and ready.
/// - **Immunity**: the four-step protection sequence, only for schemas
///   that have an immunity-eligible step.
/// - **Main**: walking the schema.
/// - **Finished**: every step done. The board is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Immunity,
    Main,
    Finished,
}

impl Phase {
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Lobby, Self::Immunity)
                | (Self::Lobby, Self::Main)
                | (Self::Immunity, Self::Main)
                | (Self::Main, Self::Finished)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Immunity => write!(f, "Immunity"),
            Self::Main => write!(f, "Main"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_can_transition_to() {
        assert!(Phase::Lobby.can_transition_to(Phase::Immunity));
        assert!(Phase::Lobby.can_transition_to(Phase::Main));
        assert!(Phase::Immunity.can_transition_to(Phase::Main));
        assert!(Phase::Main.can_transition_to(Phase::Finished));

        assert!(!Phase::Lobby.can_transition_to(Phase::Finished));
        assert!(!Phase::Main.can_transition_to(Phase::Immunity));
        assert!(!Phase::Finished.can_transition_to(Phase::Lobby));
    }

    #[test]
    fn test_draft_config_default() {
        let config = DraftConfig::default();
        assert_eq!(config.clock.turn_secs, 60);
        assert_eq!(config.clock.reserve_floor_secs, -5);
        assert_eq!(config.finished_retention, Duration::from_secs(600));
        assert_eq!(config.idle_window, Duration::from_secs(1800));
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
    }
}
