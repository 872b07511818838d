//! # pipe-temps
//!
//! Cooperative sampling and publishing core for a multi-probe temperature
//! board, with zero heap allocation.
//!
//! **Key features:**
//! - **Static allocation** - Sensor set, histories, topics and payloads are fixed-capacity
//! - **Non-blocking** - Every task is a timer-gated poll; nothing suspends the loop
//! - **Lossy-link tolerant** - Rate-limited reconnects, no backlog after an outage
//! - **Wraparound-safe time** - Elapsed time is measured on a wrapping 32-bit counter
//! - **Platform-agnostic** - Bus, network and broker client are traits
//!
//! ## Loop
//!
//! ```text
//! bus driver -> SampleScheduler -> RollingAverage -> PublishScheduler
//!                                                        |
//!                                   ConnectionManager (gate) -> PublishClient
//! ```
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate heapless;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod time;

// Sensors and their histories
pub mod sensor;

// Broker link
pub mod net;

// Periodic tasks and the loop that drives them
pub mod firmware;
pub mod scheduler;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Configuration
pub use config::{DefaultConfig, FirmwareConfig, MinimalConfig};

// Error types
pub use error::Error;

// Time
pub use time::{Clock, Instant, IntervalTimer};

// Sensors
pub use sensor::{RollingAverage, SensorAddress, SensorEntry, SensorId, SensorRegistry, TemperatureBus};

// Network
pub use net::{ConnectionManager, ConnectionState, LinkStats, NetworkLink, PublishClient, Transport};

// Schedulers and main loop
pub use firmware::{CycleReport, DefaultFirmware, Firmware, FirmwareStatus};
pub use scheduler::{PublishReport, PublishScheduler, SampleReport, SampleScheduler};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
