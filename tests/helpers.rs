//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
pub mod fixtures;

use fixtures::{ManualClock, MockBus, MockTransport, SharedBroker, TestConfig};
use pipe_temps::{ConnectionManager, Firmware, Instant};

/// Firmware type used by integration tests.
pub type TestFirmware = Firmware<MockBus, MockTransport, ManualClock, TestConfig, 4, 3>;

/// Connection manager type used by integration tests.
pub type TestConnection = ConnectionManager<MockTransport, TestConfig>;

// ============================================================================
// Creation Helpers
// ============================================================================

/// Start firmware on `bus` at t=0 against `broker`.
pub fn create_firmware(bus: MockBus, broker: &SharedBroker) -> (TestFirmware, ManualClock) {
    let clock = ManualClock::starting_at(0);
    let firmware = Firmware::start(bus, MockTransport::new(broker), clock.clone());
    (firmware, clock)
}

/// Connection manager bound to `broker`.
pub fn create_connection(broker: &SharedBroker) -> TestConnection {
    ConnectionManager::new(MockTransport::new(broker))
}

/// Instant at `ms` milliseconds.
pub fn at(ms: u32) -> Instant {
    Instant::from_millis(ms)
}

// ============================================================================
// Loop Helpers
// ============================================================================

/// Run the loop every `step_ms` from the clock's current time until `until_ms`.
pub fn run_until(firmware: &mut TestFirmware, clock: &ManualClock, step_ms: u32, until_ms: u32) {
    loop {
        firmware.run_once();
        if clock_ms(clock) >= until_ms {
            break;
        }
        clock.advance(step_ms);
    }
}

fn clock_ms(clock: &ManualClock) -> u32 {
    use pipe_temps::Clock;
    clock.now().as_millis()
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the published (topic, payload) pairs, in order.
pub fn assert_published(broker: &SharedBroker, expected: &[(&str, &str)]) {
    let broker = broker.borrow();
    let actual: Vec<(&str, &str)> = broker
        .published
        .iter()
        .map(|(t, p)| (t.as_str(), p.as_str()))
        .collect();
    assert_eq!(actual, expected, "Unexpected publishes");
}

/// Assert that no topic contains a doubled or leading separator.
pub fn assert_clean_topics(broker: &SharedBroker) {
    for (topic, _) in broker.borrow().published.iter() {
        assert!(!topic.contains("//"), "Doubled separator in {}", topic);
        assert!(!topic.starts_with('/'), "Leading separator in {}", topic);
    }
}
