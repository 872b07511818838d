//! Firmware context and cooperative main loop.
//!
//! `Firmware` owns every subsystem: bus driver, sensor registry, both
//! schedulers, the connection manager and the clock. One call to
//! [`run_once`](Firmware::run_once) is one loop iteration:
//!
//! 1. sample tick (reads sensors when due)
//! 2. publish tick (publishes averages when due)
//! 3. connection poll (keepalive, handshake progress, drop detection)
//!
//! Sampling runs first so a publish never sees an average staler than the
//! sample tick of the same iteration. No step blocks.

use crate::config::{DefaultConfig, FirmwareConfig, HISTORY_SIZE, MAX_SENSORS};
use crate::net::{ConnectionManager, ConnectionState, LinkStats, Transport};
use crate::scheduler::{PublishReport, PublishScheduler, SampleReport, SampleScheduler};
use crate::sensor::{SensorRegistry, TemperatureBus};
use crate::time::{Clock, Instant};
use log::info;

/// Firmware with the deployed capacities and configuration.
pub type DefaultFirmware<B, T, K> = Firmware<B, T, K, DefaultConfig, MAX_SENSORS, HISTORY_SIZE>;

/// What one loop iteration did.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Sampling outcome
    pub sample: SampleReport,
    /// Publishing outcome
    pub publish: PublishReport,
}

/// Snapshot of firmware health for diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FirmwareStatus {
    /// Sensors found at startup
    pub sensors: usize,
    /// Readings rejected across all sensors
    pub rejected_readings: u32,
    /// Broker link state
    pub connection: ConnectionState,
    /// Client error code of the last link or publish failure
    pub last_error_code: i32,
    /// Link counters
    pub link: LinkStats,
    /// Instant of the last sampling pass
    pub last_sample: Instant,
    /// Instant of the last publish pass
    pub last_publish: Instant,
}

/// Owned firmware context.
///
/// Generic over:
/// - `B`: TemperatureBus implementation
/// - `T`: Transport implementation
/// - `K`: Clock implementation
/// - `C`: FirmwareConfig implementation
/// - `MAX`: maximum sensor count
/// - `N`: rolling-average depth
pub struct Firmware<B, T, K, C, const MAX: usize, const N: usize>
where
    B: TemperatureBus,
    T: Transport,
    K: Clock,
    C: FirmwareConfig,
{
    bus: B,
    clock: K,
    registry: SensorRegistry<MAX, N>,
    sampler: SampleScheduler<C>,
    publisher: PublishScheduler<C>,
    connection: ConnectionManager<T, C>,
}

impl<B, T, K, C, const MAX: usize, const N: usize> core::fmt::Debug for Firmware<B, T, K, C, MAX, N>
where
    B: TemperatureBus,
    T: Transport,
    K: Clock,
    C: FirmwareConfig,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Firmware")
            .field("registry", &self.registry)
            .field("connection", &self.connection)
            .field("last_sample", &self.sampler.last_sample())
            .field("last_publish", &self.publisher.last_publish())
            .finish_non_exhaustive()
    }
}

impl<B, T, K, C, const MAX: usize, const N: usize> Firmware<B, T, K, C, MAX, N>
where
    B: TemperatureBus,
    T: Transport,
    K: Clock,
    C: FirmwareConfig,
{
    /// Discover sensors and arm both schedulers from the current time.
    ///
    /// Never fails: an empty bus produces a firmware that samples and
    /// publishes nothing.
    pub fn start(mut bus: B, transport: T, clock: K) -> Self {
        let registry = SensorRegistry::discover(&mut bus);
        let now = clock.now();
        info!(
            "{} starting with {} sensor(s), bus pin {}",
            C::HOSTNAME,
            registry.len(),
            C::BUS_PIN
        );

        Self {
            bus,
            clock,
            registry,
            sampler: SampleScheduler::new(now),
            publisher: PublishScheduler::new(now),
            connection: ConnectionManager::new(transport),
        }
    }

    /// Run one loop iteration at the clock's current time.
    pub fn run_once(&mut self) -> CycleReport {
        let now = self.clock.now();
        self.run_once_at(now)
    }

    /// Run one loop iteration at an explicit instant.
    pub fn run_once_at(&mut self, now: Instant) -> CycleReport {
        let sample = self.sampler.tick(now, &mut self.bus, &mut self.registry);
        let publish = self.publisher.tick(now, &self.registry, &mut self.connection);
        self.connection.poll(now);
        CycleReport { sample, publish }
    }

    /// Run the cooperative loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    /// Release the broker connection. The firmware may keep running and
    /// will reconnect on the next publish pass.
    pub fn shutdown(&mut self) {
        info!("Shutting down broker connection");
        self.connection.teardown();
    }

    /// Current health snapshot.
    pub fn status(&self) -> FirmwareStatus {
        FirmwareStatus {
            sensors: self.registry.len(),
            rejected_readings: self
                .registry
                .iter()
                .fold(0u32, |acc, e| acc.wrapping_add(e.rejected())),
            connection: self.connection.state(),
            last_error_code: self.connection.last_error_code(),
            link: self.connection.stats(),
            last_sample: self.sampler.last_sample(),
            last_publish: self.publisher.last_publish(),
        }
    }

    /// Get immutable reference to the sensor registry.
    pub fn registry(&self) -> &SensorRegistry<MAX, N> {
        &self.registry
    }

    /// Get immutable reference to the connection manager.
    pub fn connection(&self) -> &ConnectionManager<T, C> {
        &self.connection
    }

    /// Get mutable reference to the connection manager.
    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T, C> {
        &mut self.connection
    }

    /// Get mutable reference to the bus driver.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Get mutable reference to the clock.
    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }
}
