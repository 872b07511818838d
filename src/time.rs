//! Monotonic millisecond time with explicit wraparound handling.
//!
//! Board timers are free-running 32-bit millisecond counters that wrap after
//! roughly 49.7 days. `Instant` keeps the raw counter value and measures
//! elapsed time with wrapping subtraction, which is exact as long as the two
//! instants are less than `u32::MAX` milliseconds apart.

/// Point on a free-running 32-bit millisecond counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Instant(u32);

impl Instant {
    /// Counter value zero (the reading at boot).
    pub const ZERO: Instant = Instant(0);

    /// Create an instant from a raw millisecond counter value.
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Raw millisecond counter value.
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, correct across counter wraparound.
    pub const fn elapsed_since(self, earlier: Instant) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// True when strictly more than `interval_ms` has passed since `earlier`.
    pub const fn has_elapsed(self, earlier: Instant, interval_ms: u32) -> bool {
        self.elapsed_since(earlier) > interval_ms
    }

    /// Instant `ms` milliseconds later, wrapping at `u32::MAX`.
    pub const fn add_millis(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }
}

/// Platform-agnostic monotonic clock.
///
/// Implementations wrap the board's millisecond tick (SysTick, RTC or a HAL
/// timer). `now()` must not block.
pub trait Clock {
    /// Current counter value.
    fn now(&self) -> Instant;
}

/// Periodic gate for a timer-driven task.
///
/// `is_due` compares against the last time the gated event ran; `mark` records
/// a run. The timer never catches up on missed periods: one late call runs the
/// task once and re-arms from that call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    last: Instant,
    interval_ms: u32,
}

impl IntervalTimer {
    /// Create a timer armed from `start`.
    pub const fn new(interval_ms: u32, start: Instant) -> Self {
        Self {
            last: start,
            interval_ms,
        }
    }

    /// True when more than one interval has passed since the last run.
    pub fn is_due(&self, now: Instant) -> bool {
        now.has_elapsed(self.last, self.interval_ms)
    }

    /// Record that the gated task ran at `now`.
    pub fn mark(&mut self, now: Instant) {
        self.last = now;
    }

    /// Instant of the last recorded run (or the arming instant).
    pub fn last(&self) -> Instant {
        self.last
    }

    /// Configured interval.
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}
