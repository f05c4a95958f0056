//! Turn countdown and banked reserve accounting.

use draftforge_protocol::{Side, TickUpdate};

/// Clock settings for a draft session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Seconds each turn gets before the reserve starts draining.
    pub turn_secs: u32,
    /// Reserve each side starts with.
    pub initial_reserve_secs: i32,
    /// A side whose reserve drops strictly below this value has a
    /// selection forced on its behalf.
    pub reserve_floor_secs: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            turn_secs: 60,
            initial_reserve_secs: 300,
            reserve_floor_secs: -5,
        }
    }
}

/// What one clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// The turn countdown went down by one.
    Counting,
    /// The countdown is exhausted; the acting side's reserve went down by one.
    Overtime,
    /// The acting side's reserve is below the floor. The caller must force
    /// a selection; the clock itself doesn't change turns.
    Expired(Side),
}

/// Per-session countdown plus each side's reserve.
///
/// Reserves are signed: they keep draining below zero until the floor is
/// crossed.
#[derive(Debug, Clone)]
pub struct TurnClock {
    config: ClockConfig,
    countdown: u32,
    reserves: [i32; 2],
}

impl TurnClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            countdown: config.turn_secs,
            reserves: [config.initial_reserve_secs; 2],
        }
    }

    /// Restart the per-turn countdown. Called on every cursor advance.
    pub fn reset_turn(&mut self) {
        self.countdown = self.config.turn_secs;
    }

    /// Advance the clock by one second on `acting`'s turn.
    pub fn tick(&mut self, acting: Side) -> ClockTick {
        if self.countdown > 0 {
            self.countdown -= 1;
            return ClockTick::Counting;
        }

        let reserve = &mut self.reserves[acting.index()];
        *reserve -= 1;
        if *reserve < self.config.reserve_floor_secs {
            ClockTick::Expired(acting)
        } else {
            ClockTick::Overtime
        }
    }

    /// Seconds left on the current turn.
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// `side`'s banked reserve.
    pub fn reserve(&self, side: Side) -> i32 {
        self.reserves[side.index()]
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Snapshot for a `tick` event.
    pub fn snapshot(&self) -> TickUpdate {
        TickUpdate {
            countdown: self.countdown,
            reserve_a: self.reserve(Side::A),
            reserve_b: self.reserve(Side::B),
        }
    }
}
