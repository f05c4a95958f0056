//! Turn clock and tick timer for Draftforge.
//!
//! Three pieces, leaf first:
//!
//! - [`TurnClock`] - pure accounting: the per-turn countdown and each
//!   side's banked reserve. No time source; it advances one second per
//!   [`TurnClock::tick`] call.
//! - [`Ticker`] - a fixed-rate scheduler (1 Hz for drafts) that a governor
//!   task awaits between ticks.
//! - [`TimerHandle`] / [`TimerSlot`] - ownership of the spawned governor
//!   task, with the invariant that a session has at most one live timer.
//!
//! # Integration
//!
//! ```ignore
//! let task = tokio::spawn(async move {
//!     let mut ticker = Ticker::new(TickerConfig::default());
//!     loop {
//!         ticker.wait_for_tick().await;
//!         if manager.lock().await.tick(&code).is_stopped() {
//!             break;
//!         }
//!     }
//! });
//! session.timer_mut().install(TimerHandle::new(task.abort_handle()));
//! ```

mod clock;
mod timer;

pub use clock::{ClockConfig, ClockTick, TurnClock};
pub use timer::{TimerHandle, TimerSlot};

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`Ticker`].
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Tick rate in Hz. Draft clocks count whole seconds, so the default
    /// is 1.
    pub tick_rate_hz: u32,
    /// Random jitter (0–max µs) added to the *first* tick so sessions
    /// started in the same instant don't all wake together.
    pub initial_jitter_us: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 1,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickerConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Clamp out-of-range values. A rate of 0 would never tick, so it is
    /// raised to 1.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 {
            warn!("tick_rate_hz of 0 would never tick; using 1 Hz");
            self.tick_rate_hz = 1;
        }
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

/// Information about a fired tick, returned by [`Ticker::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Whole ticks missed because the task woke late. Missed ticks are
    /// skipped, never replayed, so a stalled governor can't burn several
    /// seconds of reserve in one burst.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Fixed-rate tick source. One per governor task.
pub struct Ticker {
    tick_duration: Duration,
    tick_count: u64,
    next_tick: TokioInstant,
}

impl Ticker {
    /// Create a ticker. The first tick fires one period (plus jitter)
    /// from now.
    pub fn new(config: TickerConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            let us = rand::rng().random_range(0..config.initial_jitter_us);
            Duration::from_micros(us)
        } else {
            Duration::ZERO
        };

        debug!(rate_hz = config.tick_rate_hz, "ticker created");

        Self {
            tick_duration,
            tick_count: 0,
            next_tick: TokioInstant::now() + tick_duration + jitter,
        }
    }

    /// Create a ticker for a specific rate with no start jitter.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickerConfig {
            tick_rate_hz,
            initial_jitter_us: 0,
        })
    }

    /// Wait until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let next = self.next_tick;
        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let ticks_skipped =
            (late_by.as_nanos() / self.tick_duration.as_nanos().max(1)) as u64;
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "tick overrun, skipping ahead"
            );
        }

        // Always schedule from now, not from the missed deadline.
        self.next_tick = now + self.tick_duration;

        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            ticks_skipped,
        }
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The fixed tick period.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
