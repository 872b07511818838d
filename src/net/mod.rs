//! Network link, transport and publish client seams.
//!
//! Radio association, sockets and the broker wire protocol are external
//! collaborators. The core sees three small traits:
//!
//! - [`NetworkLink`]: is the radio associated right now
//! - [`Transport`]: hands out a publish client bound to the broker
//! - [`PublishClient`]: pub-only broker session (connect, publish, poll)
//!
//! See [`connection::ConnectionManager`] for the state machine on top.

use core::fmt;

// Sub-modules
pub mod connection;
pub mod topic;

// Re-export key types
pub use connection::{ConnectionManager, ConnectionState, LinkStats};
pub use topic::{Payload, Topic, format_payload, format_topic};

/// Radio/network association status.
pub trait NetworkLink {
    /// True while the network path to the broker is usable.
    fn is_link_up(&self) -> bool;
}

/// Byte-stream transport that creates publish clients.
///
/// The connection manager calls `open()` on its first connect attempt and
/// keeps the client until teardown.
pub trait Transport: NetworkLink {
    /// Client type bound to this transport
    type Client: PublishClient;

    /// Platform-specific error type
    type Error: fmt::Debug;

    /// Allocate a client bound to the configured broker.
    fn open(&mut self) -> Result<Self::Client, Self::Error>;
}

/// Pub-only broker client.
///
/// No method may block indefinitely. A connect that needs several round
/// trips returns `nb::Error::WouldBlock` and is called again until it
/// completes or fails.
pub trait PublishClient {
    /// Platform-specific error type
    type Error: fmt::Debug;

    /// Start or continue a broker session handshake.
    ///
    /// Returns:
    /// - `Ok(())` once the session is established
    /// - `Err(nb::Error::WouldBlock)` while the handshake is in progress
    /// - `Err(nb::Error::Other(e))` if the handshake failed
    fn connect(&mut self, client_id: &str, user: &str, password: &str)
    -> nb::Result<(), Self::Error>;

    /// Send one message (fire-and-forget, no acknowledgement).
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Self::Error>;

    /// Service keepalive and inbound protocol traffic. Called every loop iteration.
    fn poll(&mut self) -> Result<(), Self::Error>;

    /// Close the session. Safe to call when not connected.
    fn disconnect(&mut self);

    /// True while the broker session is up.
    fn is_connected(&self) -> bool;

    /// Client-specific code of the most recent failure.
    fn last_error_code(&self) -> i32;
}
