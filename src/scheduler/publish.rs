//! Periodic publishing of every sensor's rolling average.

use crate::config::FirmwareConfig;
use crate::error::Error;
use crate::net::{ConnectionManager, Transport, format_payload, format_topic};
use crate::sensor::{SensorEntry, SensorRegistry};
use crate::time::{Instant, IntervalTimer};
use core::marker::PhantomData;
use log::{debug, error};

/// Result of one `PublishScheduler::tick` call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Publish interval had elapsed and the timer re-armed
    pub due: bool,
    /// Link was usable for this pass
    pub link_usable: bool,
    /// Messages accepted by the client
    pub published: usize,
    /// Messages that could not be formatted or sent
    pub failed: usize,
    /// Sensors skipped because they hold no readings yet
    pub skipped_empty: usize,
}

/// Publishes each sensor's average once per `PUBLISH_INTERVAL_MS`.
///
/// Values are never queued: when the link is unusable the whole pass is
/// skipped and the next pass sends fresh averages instead. The timer
/// advances either way, so an outage does not cause a burst on recovery.
#[derive(Debug)]
pub struct PublishScheduler<C: FirmwareConfig> {
    timer: IntervalTimer,
    _config: PhantomData<C>,
}

impl<C: FirmwareConfig> PublishScheduler<C> {
    /// Create scheduler armed from `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            timer: IntervalTimer::new(C::PUBLISH_INTERVAL_MS, start),
            _config: PhantomData,
        }
    }

    /// Run one publish pass if the interval has elapsed.
    ///
    /// The connection gate is only consulted when at least one sensor has
    /// a reading, so an empty registry never touches the network.
    pub fn tick<T, const MAX: usize, const N: usize>(
        &mut self,
        now: Instant,
        registry: &SensorRegistry<MAX, N>,
        connection: &mut ConnectionManager<T, C>,
    ) -> PublishReport
    where
        T: Transport,
    {
        let mut report = PublishReport::default();
        if !self.timer.is_due(now) {
            return report;
        }
        report.due = true;
        self.timer.mark(now);

        report.skipped_empty = registry.iter().filter(|e| e.history().is_empty()).count();
        if report.skipped_empty == registry.len() {
            return report;
        }

        if !connection.ensure_connected(now) {
            debug!("Link unusable, skipping publish pass");
            return report;
        }
        report.link_usable = true;

        for entry in registry.iter().filter(|e| !e.history().is_empty()) {
            match Self::publish_entry(now, entry, connection) {
                Ok(()) => report.published += 1,
                Err(e) => {
                    error!("Sensor {}: {}", entry.id(), e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Instant of the last publish pass (or the arming instant).
    pub fn last_publish(&self) -> Instant {
        self.timer.last()
    }

    fn publish_entry<T: Transport, const N: usize>(
        now: Instant,
        entry: &SensorEntry<N>,
        connection: &mut ConnectionManager<T, C>,
    ) -> Result<(), Error> {
        let average = entry.history().average()?;
        let topic = format_topic(C::TOPIC_PREFIX, entry.id())?;
        let payload = format_payload(average)?;
        connection.publish(now, &topic, &payload)
    }
}
