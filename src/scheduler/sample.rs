//! Periodic sampling of every registered sensor.

use crate::config::FirmwareConfig;
use crate::error::Error;
use crate::sensor::{SensorAddress, SensorRegistry, TemperatureBus};
use crate::time::{Instant, IntervalTimer};
use core::marker::PhantomData;
use log::warn;

/// Result of one `SampleScheduler::tick` call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SampleReport {
    /// Sample interval had elapsed and a pass ran
    pub due: bool,
    /// Readings pushed into rolling averages
    pub accepted: usize,
    /// Readings rejected as invalid
    pub rejected: usize,
}

/// Reads every sensor once per `SAMPLE_INTERVAL_MS`.
///
/// One pass triggers a single bus-wide conversion, then reads each sensor in
/// registry order. Invalid readings are counted on the entry and never
/// pushed, so a flaky probe cannot drag its average toward a sentinel.
#[derive(Debug)]
pub struct SampleScheduler<C: FirmwareConfig> {
    timer: IntervalTimer,
    _config: PhantomData<C>,
}

impl<C: FirmwareConfig> SampleScheduler<C> {
    /// Create scheduler armed from `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            timer: IntervalTimer::new(C::SAMPLE_INTERVAL_MS, start),
            _config: PhantomData,
        }
    }

    /// Run one sampling pass if the interval has elapsed.
    pub fn tick<B, const MAX: usize, const N: usize>(
        &mut self,
        now: Instant,
        bus: &mut B,
        registry: &mut SensorRegistry<MAX, N>,
    ) -> SampleReport
    where
        B: TemperatureBus,
    {
        let mut report = SampleReport::default();
        if !self.timer.is_due(now) {
            return report;
        }
        report.due = true;

        if let Err(e) = bus.request_conversion() {
            // Nothing fresh to read this pass
            warn!("Temperature conversion failed: {:?}", e);
            for entry in registry.iter_mut() {
                entry.reject();
                report.rejected += 1;
            }
            self.timer.mark(now);
            return report;
        }

        for entry in registry.iter_mut() {
            match Self::read(bus, entry.id().address()) {
                Ok(celsius) => {
                    entry.record(celsius);
                    report.accepted += 1;
                }
                Err(e) => {
                    warn!("Sensor {}: {}", entry.id(), e);
                    entry.reject();
                    report.rejected += 1;
                }
            }
        }

        self.timer.mark(now);
        report
    }

    /// Instant of the last sampling pass (or the arming instant).
    pub fn last_sample(&self) -> Instant {
        self.timer.last()
    }

    fn read<B: TemperatureBus>(bus: &mut B, address: &SensorAddress) -> Result<f32, Error> {
        let celsius = bus.read_celsius(address).map_err(|e| {
            warn!("Bus read failed: {:?}", e);
            Error::Driver
        })?;
        if is_valid::<C>(celsius) {
            Ok(celsius)
        } else {
            Err(Error::InvalidReading)
        }
    }
}

/// True for finite readings inside the configured range.
pub fn is_valid<C: FirmwareConfig>(celsius: f32) -> bool {
    (C::MIN_VALID_CELSIUS..=C::MAX_VALID_CELSIUS).contains(&celsius)
}
