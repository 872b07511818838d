//! Configuration traits and implementations for deployment constants.
//!
//! The `FirmwareConfig` trait fixes intervals, broker credentials and naming
//! at compile time without runtime overhead. Container capacities are const
//! generics on the types that own them (see [`MAX_SENSORS`] and
//! [`HISTORY_SIZE`]) because associated constants cannot size arrays in
//! generic code.

/// Default maximum number of sensors tracked on the bus.
pub const MAX_SENSORS: usize = 4;

/// Default rolling-average depth per sensor.
pub const HISTORY_SIZE: usize = 3;

/// Capacity of a formatted publish topic.
pub const TOPIC_BUFFER_SIZE: usize = 64;

/// Capacity of a formatted publish payload.
pub const PAYLOAD_BUFFER_SIZE: usize = 16;

/// Firmware configuration trait defining deployment constants.
///
/// All values are const (zero runtime cost). Intervals are in milliseconds
/// and compared with strict "greater than" semantics.
pub trait FirmwareConfig {
    /// Network hostname, also used as the broker client id
    const HOSTNAME: &'static str;

    /// Broker host name or address
    const BROKER_HOST: &'static str;

    /// Broker TCP port (default: 1883)
    const BROKER_PORT: u16;

    /// Broker user name
    const BROKER_USER: &'static str;

    /// Broker password
    const BROKER_PASSWORD: &'static str;

    /// GPIO pin of the shared sensor bus (default: 13)
    const BUS_PIN: u8;

    /// Topic prefix; the sensor identity is appended after a `/`
    const TOPIC_PREFIX: &'static str;

    /// Minimum time between sample passes (default: 1000)
    const SAMPLE_INTERVAL_MS: u32;

    /// Minimum time between publish passes (default: 10000)
    const PUBLISH_INTERVAL_MS: u32;

    /// Minimum time between reconnect attempts (default: 496)
    const RECONNECT_BACKOFF_MS: u32;

    /// Longest a pending connect may stay in progress (default: 2000)
    const CONNECT_TIMEOUT_MS: u32;

    /// Lowest temperature accepted as a valid reading
    const MIN_VALID_CELSIUS: f32;

    /// Highest temperature accepted as a valid reading
    const MAX_VALID_CELSIUS: f32;
}

/// Default configuration for the deployed pipe-temperature board.
///
/// - SAMPLE_INTERVAL_MS: 1000
/// - PUBLISH_INTERVAL_MS: 10000
/// - RECONNECT_BACKOFF_MS: 496
/// - Valid range: -55..=125 C (DS18B20 datasheet range)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl FirmwareConfig for DefaultConfig {
    const HOSTNAME: &'static str = "pipe-temperatures";
    const BROKER_HOST: &'static str = "broker.local";
    const BROKER_PORT: u16 = 1883;
    const BROKER_USER: &'static str = "user";
    const BROKER_PASSWORD: &'static str = "pass";
    const BUS_PIN: u8 = 13;
    const TOPIC_PREFIX: &'static str = "pipe-temperatures";
    const SAMPLE_INTERVAL_MS: u32 = 1000;
    const PUBLISH_INTERVAL_MS: u32 = 10_000;
    const RECONNECT_BACKOFF_MS: u32 = 496;
    const CONNECT_TIMEOUT_MS: u32 = 2000;
    const MIN_VALID_CELSIUS: f32 = -55.0;
    const MAX_VALID_CELSIUS: f32 = 125.0;
}

/// Short-interval configuration for bench testing and simulation.
///
/// Same naming and valid range as [`DefaultConfig`], with every interval
/// scaled down so a full sample/publish/reconnect cycle fits in a second.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MinimalConfig;

impl FirmwareConfig for MinimalConfig {
    const HOSTNAME: &'static str = "pipe-temperatures-bench";
    const BROKER_HOST: &'static str = "127.0.0.1";
    const BROKER_PORT: u16 = 1883;
    const BROKER_USER: &'static str = "bench";
    const BROKER_PASSWORD: &'static str = "bench";
    const BUS_PIN: u8 = 13;
    const TOPIC_PREFIX: &'static str = "bench";
    const SAMPLE_INTERVAL_MS: u32 = 50;
    const PUBLISH_INTERVAL_MS: u32 = 200;
    const RECONNECT_BACKOFF_MS: u32 = 100;
    const CONNECT_TIMEOUT_MS: u32 = 150;
    const MIN_VALID_CELSIUS: f32 = -55.0;
    const MAX_VALID_CELSIUS: f32 = 125.0;
}
