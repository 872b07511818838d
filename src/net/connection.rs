//! Broker connection state machine with rate-limited reconnects.
//!
//! ```text
//!               backoff elapsed, link up
//!  Disconnected ------------------------> Connecting
//!       ^  ^                                |    |
//!       |  |  failed / timed out / link down|    | handshake done
//!       |  +--------------------------------+    v
//!       +------------------------------------ Connected
//!              link down / session dropped
//! ```
//!
//! Reconnects are attempted at most once per `RECONNECT_BACKOFF_MS`. The
//! backoff window opens at a failed attempt only; a successful connect or a
//! detected drop leaves the gate open, so a lost session is re-established
//! on the next `ensure_connected` call.

use super::{PublishClient, Transport};
use crate::config::FirmwareConfig;
use crate::error::Error;
use crate::time::Instant;
use core::marker::PhantomData;
use log::{debug, error, warn};

/// Broker link state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Link not usable (initial state)
    Disconnected,

    /// Handshake in progress
    Connecting,

    /// Link usable for publish
    Connected,
}

/// Link counters for diagnostics. All counters wrap.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Connect attempts started
    pub attempts: u32,
    /// Attempts that failed or timed out
    pub failures: u32,
    /// Established sessions that were lost
    pub drops: u32,
    /// Messages handed to the client
    pub publishes: u32,
    /// Messages the client rejected
    pub publish_failures: u32,
}

/// Outcome of driving one connect step, computed while the client is borrowed.
enum Handshake {
    Done,
    Pending,
    TimedOut(i32),
    Failed(i32),
}

/// Owner of the transport, the publish client and the link state.
///
/// The client is created on the first connect attempt and released by
/// [`teardown`](Self::teardown), which also runs on drop.
///
/// Generic over:
/// - `T`: Transport implementation
/// - `C`: FirmwareConfig implementation (credentials, backoff, timeout)
pub struct ConnectionManager<T, C>
where
    T: Transport,
    C: FirmwareConfig,
{
    transport: T,
    client: Option<T::Client>,
    state: ConnectionState,
    /// Start of the current backoff window (None: may attempt immediately)
    last_attempt: Option<Instant>,
    /// When the pending handshake started
    connect_started: Instant,
    last_error: Option<Error>,
    last_error_code: i32,
    stats: LinkStats,
    _config: PhantomData<C>,
}

impl<T, C> core::fmt::Debug for ConnectionManager<T, C>
where
    T: Transport,
    C: FirmwareConfig,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state)
            .field("client", &self.client.as_ref().map(|_| "<client>"))
            .field("last_attempt", &self.last_attempt)
            .field("last_error", &self.last_error)
            .field("last_error_code", &self.last_error_code)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<T, C> ConnectionManager<T, C>
where
    T: Transport,
    C: FirmwareConfig,
{
    /// Create manager in `Disconnected` state. No client is allocated yet.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            client: None,
            state: ConnectionState::Disconnected,
            last_attempt: None,
            connect_started: Instant::ZERO,
            last_error: None,
            last_error_code: 0,
            stats: LinkStats::default(),
            _config: PhantomData,
        }
    }

    /// Make the link usable if possible without blocking.
    ///
    /// - `Connected`: no-op, returns true while the link holds
    /// - `Connecting`: advances the pending handshake
    /// - `Disconnected`: starts a connect if the network is up and the
    ///   backoff window has passed; otherwise returns false untouched
    ///
    /// Returns true iff the link is usable when the call returns.
    pub fn ensure_connected(&mut self, now: Instant) -> bool {
        self.check_link(now);

        match self.state {
            ConnectionState::Connected => true,
            ConnectionState::Connecting => self.advance_handshake(now),
            ConnectionState::Disconnected => {
                if !self.transport.is_link_up() {
                    return false;
                }
                if let Some(last) = self.last_attempt
                    && !now.has_elapsed(last, C::RECONNECT_BACKOFF_MS)
                {
                    return false;
                }
                self.begin_connect(now)
            }
        }
    }

    /// Per-iteration service: keepalive when connected, handshake progress
    /// when connecting, drop detection in both.
    pub fn poll(&mut self, now: Instant) {
        match self.state {
            ConnectionState::Connected => {
                if let Some(client) = self.client.as_mut()
                    && let Err(e) = client.poll()
                {
                    let code = client.last_error_code();
                    warn!("Client poll failed: {:?} (code {})", e, code);
                    self.last_error_code = code;
                    self.last_error = Some(Error::PollFailed { code });
                }
                self.check_link(now);
            }
            ConnectionState::Connecting => {
                self.check_link(now);
                if self.state == ConnectionState::Connecting {
                    self.advance_handshake(now);
                }
            }
            ConnectionState::Disconnected => {}
        }
    }

    /// Publish one message on the established session.
    ///
    /// Fails with `Error::LinkDown` unless `Connected`; a session found to be
    /// dropped is marked as such first, never reported as sent.
    pub fn publish(&mut self, now: Instant, topic: &str, payload: &str) -> Result<(), Error> {
        self.check_link(now);
        if self.state != ConnectionState::Connected {
            return Err(Error::LinkDown);
        }
        let client = self.client.as_mut().ok_or(Error::LinkDown)?;

        match client.publish(topic, payload) {
            Ok(()) => {
                self.stats.publishes = self.stats.publishes.wrapping_add(1);
                Ok(())
            }
            Err(e) => {
                let code = client.last_error_code();
                error!("Publish to {} failed: {:?} (code {})", topic, e, code);
                self.stats.publish_failures = self.stats.publish_failures.wrapping_add(1);
                self.last_error_code = code;
                let err = Error::PublishFailed { code };
                self.last_error = Some(err);
                self.check_link(now);
                Err(err)
            }
        }
    }

    /// Close the session, release the client and force `Disconnected`.
    ///
    /// Safe to call in any state and more than once.
    pub fn teardown(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.disconnect();
            debug!("Broker client released");
        }
        self.state = ConnectionState::Disconnected;
        self.last_attempt = None;
    }

    /// Current link state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True while `Connected`.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Most recent link or publish error, if any.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// Client error code captured at the most recent failure (0 if none).
    pub fn last_error_code(&self) -> i32 {
        self.last_error_code
    }

    /// Link counters.
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// True while a publish client is allocated.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Get immutable reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn begin_connect(&mut self, now: Instant) -> bool {
        self.stats.attempts = self.stats.attempts.wrapping_add(1);
        self.last_attempt = Some(now);

        if self.client.is_none() {
            match self.transport.open() {
                Ok(client) => self.client = Some(client),
                Err(e) => {
                    error!("Transport open failed: {:?}", e);
                    self.fail_attempt(now, Error::ConnectFailed { code: -1 }, -1);
                    return false;
                }
            }
        }

        self.connect_started = now;
        self.state = ConnectionState::Connecting;
        self.advance_handshake(now)
    }

    fn advance_handshake(&mut self, now: Instant) -> bool {
        let Some(client) = self.client.as_mut() else {
            self.state = ConnectionState::Disconnected;
            return false;
        };

        let step = match client.connect(C::HOSTNAME, C::BROKER_USER, C::BROKER_PASSWORD) {
            Ok(()) => Handshake::Done,
            Err(nb::Error::WouldBlock) => {
                if now.has_elapsed(self.connect_started, C::CONNECT_TIMEOUT_MS) {
                    let code = client.last_error_code();
                    client.disconnect();
                    Handshake::TimedOut(code)
                } else {
                    Handshake::Pending
                }
            }
            Err(nb::Error::Other(e)) => {
                let code = client.last_error_code();
                error!("Broker connect failed: {:?} (code {})", e, code);
                Handshake::Failed(code)
            }
        };

        match step {
            Handshake::Done => {
                debug!("Connected to broker as {}", C::HOSTNAME);
                self.state = ConnectionState::Connected;
                self.last_attempt = None;
                true
            }
            Handshake::Pending => false,
            Handshake::TimedOut(code) => {
                error!("Broker connect timed out after {} ms", C::CONNECT_TIMEOUT_MS);
                self.fail_attempt(now, Error::ConnectTimeout, code);
                false
            }
            Handshake::Failed(code) => {
                self.fail_attempt(now, Error::ConnectFailed { code }, code);
                false
            }
        }
    }

    fn fail_attempt(&mut self, now: Instant, err: Error, code: i32) {
        self.stats.failures = self.stats.failures.wrapping_add(1);
        self.state = ConnectionState::Disconnected;
        self.last_attempt = Some(now);
        self.last_error = Some(err);
        self.last_error_code = code;
    }

    /// Detect a lost radio link or broker session without waiting for a publish.
    fn check_link(&mut self, now: Instant) {
        let link_up = self.transport.is_link_up();

        match self.state {
            ConnectionState::Connected => {
                let session_up = self.client.as_ref().is_some_and(|c| c.is_connected());
                if link_up && session_up {
                    return;
                }
                warn!(
                    "Broker link lost (network {}, session {})",
                    if link_up { "up" } else { "down" },
                    if session_up { "up" } else { "down" }
                );
                if let Some(client) = self.client.as_mut() {
                    self.last_error_code = client.last_error_code();
                    client.disconnect();
                }
                self.stats.drops = self.stats.drops.wrapping_add(1);
                self.state = ConnectionState::Disconnected;
                self.last_attempt = None;
                self.last_error = Some(Error::LinkDown);
            }
            ConnectionState::Connecting if !link_up => {
                warn!("Network down during broker handshake");
                if let Some(client) = self.client.as_mut() {
                    client.disconnect();
                }
                let code = self.last_error_code;
                self.fail_attempt(now, Error::LinkDown, code);
            }
            _ => {}
        }
    }
}

impl<T, C> Drop for ConnectionManager<T, C>
where
    T: Transport,
    C: FirmwareConfig,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
