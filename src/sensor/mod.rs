//! Sensor identity and the temperature bus driver seam.
//!
//! The bus driver (1-Wire or similar) is an external collaborator. The core
//! only needs to enumerate device addresses once at startup, trigger one
//! shared conversion per sample pass, and read each address back.

use core::fmt;

// Sub-modules
pub mod average;
pub mod registry;

// Re-export key types
pub use average::RollingAverage;
pub use registry::{SensorEntry, SensorRegistry};

/// Raw bus address of one probe.
pub type SensorAddress = [u8; 8];

/// Length of the hexadecimal rendering of a [`SensorAddress`].
pub const SENSOR_HEX_LEN: usize = 16;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Stable identity of one physical probe.
///
/// Holds the raw address and its upper-case hex rendering, computed once
/// at discovery and used as the topic suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorId {
    address: SensorAddress,
    hex: heapless::String<SENSOR_HEX_LEN>,
}

impl SensorId {
    /// Create identity from a raw bus address.
    pub fn new(address: SensorAddress) -> Self {
        let mut hex = heapless::String::new();
        for byte in address {
            // Capacity is exactly two digits per byte
            hex.push(HEX_DIGITS[(byte >> 4) as usize] as char).ok();
            hex.push(HEX_DIGITS[(byte & 0x0F) as usize] as char).ok();
        }
        Self { address, hex }
    }

    /// Raw bus address.
    pub fn address(&self) -> &SensorAddress {
        &self.address
    }

    /// Upper-case hexadecimal rendering (16 characters).
    pub fn as_hex(&self) -> &str {
        self.hex.as_str()
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_hex())
    }
}

/// Platform-agnostic temperature bus driver.
///
/// Implementations wrap the board's bus library. None of the methods may
/// block for longer than one bus transaction.
pub trait TemperatureBus {
    /// Platform-specific error type
    type Error: fmt::Debug;

    /// Number of devices found on the bus.
    fn device_count(&mut self) -> Result<usize, Self::Error>;

    /// Address of the device at `index`.
    ///
    /// Returns:
    /// - `Ok(Some(address))` if the device answered with a valid address
    /// - `Ok(None)` if the address could not be resolved (CRC failure, etc.)
    /// - `Err(Self::Error)` on bus error
    fn device_address(&mut self, index: usize) -> Result<Option<SensorAddress>, Self::Error>;

    /// Start one temperature conversion on every device at once.
    fn request_conversion(&mut self) -> Result<(), Self::Error>;

    /// Read the last converted temperature of one device, in degrees Celsius.
    ///
    /// Drivers that report a disconnected probe through a sentinel value
    /// (e.g. -127) may return it as-is; the sampler range-checks readings.
    fn read_celsius(&mut self, address: &SensorAddress) -> Result<f32, Self::Error>;
}
