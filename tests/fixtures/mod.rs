//! Test fixtures and utilities for pipe-temps testing.
//!
//! Provides:
//! - `MockBus`: in-memory TemperatureBus with settable readings
//! - `MockTransport` / `MockClient`: scripted broker sharing one `BrokerState`
//! - `ManualClock`: clock advanced by hand
//! - `TestConfig`: short, round-numbered intervals and a prefix with a trailing `/`

#![allow(dead_code)]

use pipe_temps::{Clock, FirmwareConfig, Instant, NetworkLink, PublishClient, SensorAddress, TemperatureBus, Transport};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

// ============================================================================
// TestConfig
// ============================================================================

/// Configuration used by integration tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TestConfig;

impl FirmwareConfig for TestConfig {
    const HOSTNAME: &'static str = "test-board";
    const BROKER_HOST: &'static str = "broker.test";
    const BROKER_PORT: u16 = 1883;
    const BROKER_USER: &'static str = "tester";
    const BROKER_PASSWORD: &'static str = "secret";
    const BUS_PIN: u8 = 13;
    const TOPIC_PREFIX: &'static str = "home/pipes/";
    const SAMPLE_INTERVAL_MS: u32 = 1000;
    const PUBLISH_INTERVAL_MS: u32 = 10_000;
    const RECONNECT_BACKOFF_MS: u32 = 500;
    const CONNECT_TIMEOUT_MS: u32 = 2000;
    const MIN_VALID_CELSIUS: f32 = -55.0;
    const MAX_VALID_CELSIUS: f32 = 125.0;
}

/// Sensor address whose hex rendering ends in the given byte.
pub fn address(tag: u8) -> SensorAddress {
    [0x28, 0, 0, 0, 0, 0, 0, tag]
}

// ============================================================================
// MockBus - Test TemperatureBus Implementation
// ============================================================================

/// One device on the mock bus.
#[derive(Debug, Clone)]
pub struct MockDevice {
    /// Address, or None if the device cannot be resolved
    pub address: Option<SensorAddress>,
    /// Reading returned by the next read
    pub celsius: Result<f32, ()>,
}

/// In-memory bus.
#[derive(Debug, Default)]
pub struct MockBus {
    pub devices: Vec<MockDevice>,
    pub conversions: usize,
    pub reads: Vec<SensorAddress>,
}

impl MockBus {
    /// Bus with resolvable devices at the given tags, all reading `celsius`.
    pub fn with_sensors(tags: &[u8], celsius: f32) -> Self {
        Self {
            devices: tags
                .iter()
                .map(|&tag| MockDevice {
                    address: Some(address(tag)),
                    celsius: Ok(celsius),
                })
                .collect(),
            conversions: 0,
            reads: Vec::new(),
        }
    }

    /// Set the reading of the device at `index`.
    pub fn set_reading(&mut self, index: usize, celsius: f32) {
        self.devices[index].celsius = Ok(celsius);
    }

    /// Make reads of the device at `index` fail.
    pub fn fail_reading(&mut self, index: usize) {
        self.devices[index].celsius = Err(());
    }
}

impl TemperatureBus for MockBus {
    type Error = ();

    fn device_count(&mut self) -> Result<usize, Self::Error> {
        Ok(self.devices.len())
    }

    fn device_address(&mut self, index: usize) -> Result<Option<SensorAddress>, Self::Error> {
        Ok(self.devices.get(index).and_then(|d| d.address))
    }

    fn request_conversion(&mut self) -> Result<(), Self::Error> {
        self.conversions += 1;
        Ok(())
    }

    fn read_celsius(&mut self, address: &SensorAddress) -> Result<f32, Self::Error> {
        self.reads.push(*address);
        self.devices
            .iter()
            .find(|d| d.address.as_ref() == Some(address))
            .map(|d| d.celsius)
            .unwrap_or(Err(()))
    }
}

// ============================================================================
// Scripted broker
// ============================================================================

/// Response of the mock client to one `connect` call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectStep {
    /// Session established
    Accept,
    /// Handshake still in progress
    Pending,
    /// Refused with error code
    Refuse(i32),
}

/// Broker-side state shared by transport, client and test.
#[derive(Debug)]
pub struct BrokerState {
    /// Radio association
    pub link_up: bool,
    /// Broker session
    pub session_up: bool,
    /// Responses to upcoming connect calls (Accept once empty)
    pub connect_script: VecDeque<ConnectStep>,
    /// Reject every publish
    pub fail_publishes: bool,
    /// Fail every keepalive poll
    pub fail_polls: bool,
    /// Error code reported by the client
    pub error_code: i32,
    pub opens: usize,
    pub connect_calls: usize,
    pub disconnects: usize,
    pub polls: usize,
    pub clients_dropped: usize,
    /// Accepted messages (topic, payload)
    pub published: Vec<(String, String)>,
    /// Publish calls including rejected ones
    pub publish_calls: usize,
}

impl Default for BrokerState {
    fn default() -> Self {
        Self {
            link_up: true,
            session_up: false,
            connect_script: VecDeque::new(),
            fail_publishes: false,
            fail_polls: false,
            error_code: 0,
            opens: 0,
            connect_calls: 0,
            disconnects: 0,
            polls: 0,
            clients_dropped: 0,
            published: Vec::new(),
            publish_calls: 0,
        }
    }
}

/// Handle to the shared broker state.
pub type SharedBroker = Rc<RefCell<BrokerState>>;

/// Create a broker with the link up and no session.
pub fn broker() -> SharedBroker {
    Rc::new(RefCell::new(BrokerState::default()))
}

/// Mock client error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockError;

/// Client bound to a shared broker.
#[derive(Debug)]
pub struct MockClient {
    broker: SharedBroker,
}

impl PublishClient for MockClient {
    type Error = MockError;

    fn connect(&mut self, client_id: &str, user: &str, password: &str) -> nb::Result<(), MockError> {
        assert_eq!(client_id, TestConfig::HOSTNAME);
        assert_eq!(user, TestConfig::BROKER_USER);
        assert_eq!(password, TestConfig::BROKER_PASSWORD);

        let mut broker = self.broker.borrow_mut();
        broker.connect_calls += 1;
        match broker.connect_script.pop_front().unwrap_or(ConnectStep::Accept) {
            ConnectStep::Accept => {
                broker.session_up = true;
                Ok(())
            }
            ConnectStep::Pending => Err(nb::Error::WouldBlock),
            ConnectStep::Refuse(code) => {
                broker.error_code = code;
                Err(nb::Error::Other(MockError))
            }
        }
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), MockError> {
        let mut broker = self.broker.borrow_mut();
        broker.publish_calls += 1;
        if !broker.session_up || broker.fail_publishes {
            broker.error_code = -3;
            return Err(MockError);
        }
        broker.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }

    fn poll(&mut self) -> Result<(), MockError> {
        let mut broker = self.broker.borrow_mut();
        broker.polls += 1;
        if broker.fail_polls {
            broker.error_code = -4;
            return Err(MockError);
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut broker = self.broker.borrow_mut();
        broker.session_up = false;
        broker.disconnects += 1;
    }

    fn is_connected(&self) -> bool {
        self.broker.borrow().session_up
    }

    fn last_error_code(&self) -> i32 {
        self.broker.borrow().error_code
    }
}

impl Drop for MockClient {
    fn drop(&mut self) {
        self.broker.borrow_mut().clients_dropped += 1;
    }
}

/// Transport bound to a shared broker.
#[derive(Debug)]
pub struct MockTransport {
    broker: SharedBroker,
}

impl MockTransport {
    pub fn new(broker: &SharedBroker) -> Self {
        Self {
            broker: Rc::clone(broker),
        }
    }
}

impl NetworkLink for MockTransport {
    fn is_link_up(&self) -> bool {
        self.broker.borrow().link_up
    }
}

impl Transport for MockTransport {
    type Client = MockClient;
    type Error = ();

    fn open(&mut self) -> Result<MockClient, ()> {
        self.broker.borrow_mut().opens += 1;
        Ok(MockClient {
            broker: Rc::clone(&self.broker),
        })
    }
}

// ============================================================================
// ManualClock
// ============================================================================

/// Clock whose time is set by the test through a shared handle.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now.get())
    }
}
