//! Sensor registry built once by bus discovery.
//!
//! Entries are appended only during startup and never removed or reordered,
//! so an entry's index is a stable handle for the life of the firmware.

use super::{RollingAverage, SensorAddress, SensorId, TemperatureBus};
use crate::error::Error;
use log::{debug, warn};

/// One discovered sensor with its reading history.
///
/// Readings enter the history only through `SampleScheduler`, which applies
/// the configured range check:
///
/// ```compile_fail
/// use pipe_temps::{SensorEntry, SensorId};
///
/// let mut entry = SensorEntry::<3>::new(SensorId::new([0x28, 0, 0, 0, 0, 0, 0, 1]));
/// entry.record(-127.0);
/// ```
#[derive(Debug)]
pub struct SensorEntry<const N: usize> {
    id: SensorId,
    history: RollingAverage<N>,
    rejected: u32,
}

impl<const N: usize> SensorEntry<N> {
    /// Create entry with an empty history.
    pub fn new(id: SensorId) -> Self {
        Self {
            id,
            history: RollingAverage::new(),
            rejected: 0,
        }
    }

    /// Sensor identity.
    pub fn id(&self) -> &SensorId {
        &self.id
    }

    /// Rolling history of accepted readings.
    pub fn history(&self) -> &RollingAverage<N> {
        &self.history
    }

    /// Accept a reading into the history.
    pub(crate) fn record(&mut self, celsius: f32) {
        self.history.push(celsius);
    }

    /// Count a reading that was not accepted.
    pub fn reject(&mut self) {
        self.rejected = self.rejected.wrapping_add(1);
    }

    /// Number of readings rejected since startup.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

/// Ordered, fixed-capacity set of sensors.
///
/// Generic over:
/// - `MAX`: maximum number of sensors
/// - `N`: rolling-average depth per sensor
#[derive(Debug)]
pub struct SensorRegistry<const MAX: usize, const N: usize> {
    entries: heapless::Vec<SensorEntry<N>, MAX>,
}

impl<const MAX: usize, const N: usize> SensorRegistry<MAX, N> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    /// Enumerate the bus and register up to `MAX` sensors.
    ///
    /// Devices whose address cannot be resolved are skipped and logged. A
    /// bus error while counting devices yields an empty registry; the
    /// firmware still runs with nothing to publish.
    pub fn discover<B: TemperatureBus>(bus: &mut B) -> Self {
        let mut registry = Self::new();

        let count = match bus.device_count() {
            Ok(count) => count.min(MAX),
            Err(e) => {
                warn!("Sensor enumeration failed: {:?}", e);
                return registry;
            }
        };
        debug!("{} devices found", count);

        for index in 0..count {
            match Self::resolve(bus, index) {
                Ok(address) => {
                    let id = SensorId::new(address);
                    debug!("Device {} has address {}", index, id);
                    // Cannot overflow: count is capped at MAX
                    let _ = registry.add(id);
                }
                Err(e) => warn!("Skipping device {}: {}", index, e),
            }
        }

        registry
    }

    fn resolve<B: TemperatureBus>(bus: &mut B, index: usize) -> Result<SensorAddress, Error> {
        match bus.device_address(index) {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(Error::AddressUnavailable { index }),
            Err(e) => {
                warn!("Bus error reading address {}: {:?}", index, e);
                Err(Error::AddressUnavailable { index })
            }
        }
    }

    /// Append a sensor.
    ///
    /// Returns `Err(Error::RegistryFull)` once `MAX` sensors are registered.
    pub fn add(&mut self, id: SensorId) -> Result<(), Error> {
        self.entries
            .push(SensorEntry::new(id))
            .map_err(|_| Error::RegistryFull)
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no sensor was discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, in discovery order.
    pub fn get(&self, index: usize) -> Option<&SensorEntry<N>> {
        self.entries.get(index)
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &SensorEntry<N>> {
        self.entries.iter()
    }

    /// Mutable entries in discovery order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SensorEntry<N>> {
        self.entries.iter_mut()
    }
}

impl<const MAX: usize, const N: usize> Default for SensorRegistry<MAX, N> {
    fn default() -> Self {
        Self::new()
    }
}
