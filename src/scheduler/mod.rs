//! Timer-gated periodic tasks.
//!
//! Each scheduler owns one [`IntervalTimer`](crate::time::IntervalTimer) and
//! returns immediately from `tick()` until its interval has elapsed. A due
//! tick runs once and re-arms from the tick's instant, so a long stall never
//! produces a burst of catch-up ticks.

// Sub-modules
pub mod publish;
pub mod sample;

// Re-export key types
pub use publish::{PublishReport, PublishScheduler};
pub use sample::{SampleReport, SampleScheduler};
