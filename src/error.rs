//! Error types for sampling and publishing.
//!
//! The `Error` enum covers every failure the core can observe. None of them
//! are fatal: the main loop logs them and carries on.

use core::fmt;

/// Firmware error type.
///
/// Grouped by where the failure originates: discovery, sampling, link and
/// publish. Codes carried by link and publish variants are the publish
/// client's own `last_error_code()` at the time of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Average requested from a buffer with no samples
    EmptyAverage,

    /// Driver reported an invalid or out-of-range temperature
    InvalidReading,

    /// Driver could not resolve the address of a device index
    AddressUnavailable {
        /// Device index on the bus
        index: usize,
    },

    /// Registry already holds its maximum number of sensors
    RegistryFull,

    /// Formatted topic does not fit the topic buffer
    TopicTooLong,

    /// Formatted payload does not fit the payload buffer
    PayloadTooLong,

    /// Network link is down
    LinkDown,

    /// Broker connect attempt failed
    ConnectFailed {
        /// Client error code
        code: i32,
    },

    /// Pending connect did not complete in time
    ConnectTimeout,

    /// Publish was rejected by the client
    PublishFailed {
        /// Client error code
        code: i32,
    },

    /// Keepalive service reported an error
    PollFailed {
        /// Client error code
        code: i32,
    },

    /// Sensor bus driver failure
    Driver,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyAverage => write!(f, "No samples to average"),
            Error::InvalidReading => write!(f, "Invalid reading"),
            Error::AddressUnavailable { index } => {
                write!(f, "No address for device {}", index)
            }
            Error::RegistryFull => write!(f, "Sensor registry full"),
            Error::TopicTooLong => write!(f, "Topic too long"),
            Error::PayloadTooLong => write!(f, "Payload too long"),
            Error::LinkDown => write!(f, "Network link down"),
            Error::ConnectFailed { code } => write!(f, "Connect failed (code {})", code),
            Error::ConnectTimeout => write!(f, "Connect timed out"),
            Error::PublishFailed { code } => write!(f, "Publish failed (code {})", code),
            Error::PollFailed { code } => write!(f, "Keepalive failed (code {})", code),
            Error::Driver => write!(f, "Sensor driver error"),
        }
    }
}
