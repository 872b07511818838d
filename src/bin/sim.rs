//! Host simulator for the pipe-temps loop.
//!
//! Runs the firmware core against simulated probes and a flaky broker,
//! logging every publish. An optional TOML scenario file overrides the
//! defaults:
//!
//! ```toml
//! run_for_ms = 5000
//! connect_failure_rate = 0.3
//! outage_every_ms = 2000
//! outage_ms = 600
//!
//! [[sensors]]
//! base_celsius = 45.0
//! noise = 0.5
//!
//! [[sensors]]
//! base_celsius = 12.0
//! failure_rate = 0.2
//! ```
//!
//! ```bash
//! RUST_LOG=debug cargo run --features sim --bin pipe-temps-sim -- scenario.toml
//! ```

use log::{error, info};
use pipe_temps::{
    Clock, Firmware, FirmwareConfig, Instant, MinimalConfig, NetworkLink, PublishClient,
    SensorAddress, TemperatureBus, Transport,
};
use serde::Deserialize;
use std::time::{Duration, Instant as StdInstant};
use std::{env, fs, process, thread};

// ============================================================================
// Scenario
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Scenario {
    /// Total simulated run time
    run_for_ms: u32,
    /// Sleep between loop iterations
    step_ms: u64,
    /// Probability that a finished handshake is refused
    connect_failure_rate: f32,
    /// Probability that a publish is rejected
    publish_failure_rate: f32,
    /// Period of network outages (0 disables)
    outage_every_ms: u32,
    /// Length of each outage
    outage_ms: u32,
    sensors: Vec<SimSensor>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            run_for_ms: 3000,
            step_ms: 5,
            connect_failure_rate: 0.2,
            publish_failure_rate: 0.05,
            outage_every_ms: 1500,
            outage_ms: 400,
            sensors: vec![
                SimSensor {
                    base_celsius: 48.0,
                    ..SimSensor::default()
                },
                SimSensor {
                    base_celsius: 31.5,
                    ..SimSensor::default()
                },
                SimSensor {
                    base_celsius: 9.0,
                    failure_rate: 0.25,
                    ..SimSensor::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct SimSensor {
    base_celsius: f32,
    /// Peak-to-peak noise added to every reading
    noise: f32,
    /// Probability that a reading comes back as the -127 sentinel
    failure_rate: f32,
    /// Address cannot be resolved at discovery
    unresolvable: bool,
}

impl Default for SimSensor {
    fn default() -> Self {
        Self {
            base_celsius: 20.0,
            noise: 0.4,
            failure_rate: 0.0,
            unresolvable: false,
        }
    }
}

fn load_scenario() -> Scenario {
    let Some(path) = env::args().nth(1) else {
        return Scenario::default();
    };
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            error!("Cannot read {}: {}", path, e);
            process::exit(1);
        }
    };
    match toml::from_str(&text) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("Invalid scenario {}: {}", path, e);
            process::exit(1);
        }
    }
}

/// Uniform sample in [0, 1].
fn random_unit() -> f32 {
    let mut buf = [0u8; 4];
    if getrandom::fill(&mut buf).is_err() {
        return 0.5;
    }
    u32::from_le_bytes(buf) as f32 / u32::MAX as f32
}

fn chance(rate: f32) -> bool {
    rate > 0.0 && random_unit() < rate
}

// ============================================================================
// Simulated hardware
// ============================================================================

struct SimClock {
    started: StdInstant,
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        // Truncation is the counter wrap
        Instant::from_millis(self.started.elapsed().as_millis() as u32)
    }
}

struct SimBus {
    sensors: Vec<SimSensor>,
}

fn sim_address(index: usize) -> SensorAddress {
    [0x28, 0xFF, 0x64, 0x1E, 0x00, 0x00, index as u8, 0x5A ^ index as u8]
}

impl TemperatureBus for SimBus {
    type Error = ();

    fn device_count(&mut self) -> Result<usize, ()> {
        Ok(self.sensors.len())
    }

    fn device_address(&mut self, index: usize) -> Result<Option<SensorAddress>, ()> {
        let sensor = self.sensors.get(index).ok_or(())?;
        Ok((!sensor.unresolvable).then(|| sim_address(index)))
    }

    fn request_conversion(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn read_celsius(&mut self, address: &SensorAddress) -> Result<f32, ()> {
        let sensor = self.sensors.get(address[6] as usize).ok_or(())?;
        if chance(sensor.failure_rate) {
            return Ok(-127.0);
        }
        Ok(sensor.base_celsius + (random_unit() - 0.5) * sensor.noise)
    }
}

struct SimTransport {
    started: StdInstant,
    outage_every_ms: u32,
    outage_ms: u32,
    connect_failure_rate: f32,
    publish_failure_rate: f32,
}

impl NetworkLink for SimTransport {
    fn is_link_up(&self) -> bool {
        if self.outage_every_ms == 0 {
            return true;
        }
        let phase = self.started.elapsed().as_millis() as u32 % self.outage_every_ms;
        phase < self.outage_every_ms.saturating_sub(self.outage_ms)
    }
}

impl Transport for SimTransport {
    type Client = SimClient;
    type Error = ();

    fn open(&mut self) -> Result<SimClient, ()> {
        info!(
            "Opening client to {}:{}",
            MinimalConfig::BROKER_HOST,
            MinimalConfig::BROKER_PORT
        );
        Ok(SimClient {
            connected: false,
            handshake_steps: 0,
            last_error: 0,
            connect_failure_rate: self.connect_failure_rate,
            publish_failure_rate: self.publish_failure_rate,
        })
    }
}

#[derive(Debug)]
enum SimError {
    Refused,
    Rejected,
}

struct SimClient {
    connected: bool,
    handshake_steps: u8,
    last_error: i32,
    connect_failure_rate: f32,
    publish_failure_rate: f32,
}

impl PublishClient for SimClient {
    type Error = SimError;

    fn connect(&mut self, client_id: &str, _user: &str, _password: &str) -> nb::Result<(), SimError> {
        // Three round trips per handshake
        if self.handshake_steps < 2 {
            self.handshake_steps += 1;
            return Err(nb::Error::WouldBlock);
        }
        self.handshake_steps = 0;
        if chance(self.connect_failure_rate) {
            self.last_error = 5;
            return Err(nb::Error::Other(SimError::Refused));
        }
        info!("Session opened for {}", client_id);
        self.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), SimError> {
        if chance(self.publish_failure_rate) {
            self.last_error = -3;
            return Err(SimError::Rejected);
        }
        info!("PUBLISH {} {}", topic, payload);
        Ok(())
    }

    fn poll(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.handshake_steps = 0;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn last_error_code(&self) -> i32 {
        self.last_error
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scenario = load_scenario();
    let started = StdInstant::now();

    let bus = SimBus {
        sensors: scenario.sensors.clone(),
    };
    let transport = SimTransport {
        started,
        outage_every_ms: scenario.outage_every_ms,
        outage_ms: scenario.outage_ms,
        connect_failure_rate: scenario.connect_failure_rate,
        publish_failure_rate: scenario.publish_failure_rate,
    };
    let clock = SimClock { started };

    let mut firmware: Firmware<_, _, _, MinimalConfig, 4, 3> = Firmware::start(bus, transport, clock);

    let step = Duration::from_millis(scenario.step_ms);
    while started.elapsed().as_millis() < scenario.run_for_ms as u128 {
        firmware.run_once();
        thread::sleep(step);
    }

    firmware.shutdown();
    let status = firmware.status();
    info!(
        "Done: {} sensor(s), {} rejected reading(s), {} publish(es), {} failed, {} connect attempt(s), {} drop(s)",
        status.sensors,
        status.rejected_readings,
        status.link.publishes,
        status.link.publish_failures,
        status.link.attempts,
        status.link.drops
    );
}
