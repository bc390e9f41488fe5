//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CommandService / StationMonitor (domain)
//! ```
//!
//! Driven adapters (sockets, the indicator pin, the access point's station
//! table, event sinks) implement these traits.  The
//! [`CommandService`](super::service::CommandService) and
//! [`StationMonitor`](super::monitor::StationMonitor) consume them via
//! generics, so the domain core never touches lwIP or GPIO directly.
//!
//! ## Ownership notes
//!
//! - A [`Listener`] and its [`Connection`]s are owned by exactly one task.
//!   Dropping either closes the underlying socket.
//! - [`IndicatorPort`] and [`StationTable`] take `&self`: they are shared
//!   between tasks and synchronise internally.

use core::net::{SocketAddr, SocketAddrV4};
use core::time::Duration;
use std::sync::Arc;

use crate::error::{ApError, SocketError};

use super::events::{AppEvent, StationList};

// ───────────────────────────────────────────────────────────────
// Socket ports (driven adapter: domain ↔ TCP/IP stack)
// ───────────────────────────────────────────────────────────────

/// Builds listening sockets: create → bind → listen in one step.
pub trait SocketFactory {
    type Listener: Listener;

    /// Create a stream socket, bind it to `addr` and start listening with
    /// the given pending-connection `backlog`.
    ///
    /// The error identifies which of the three steps failed.
    fn listen(&mut self, addr: SocketAddrV4, backlog: u8) -> Result<Self::Listener, SocketError>;
}

/// A bound, listening socket.
pub trait Listener {
    type Connection: Connection;

    /// Address actually bound (resolves an ephemeral port), if known.
    fn local_addr(&self) -> Option<SocketAddr>;

    /// Block until a client connects.
    fn accept(&mut self) -> Result<(Self::Connection, SocketAddr), SocketError>;
}

/// An accepted client stream.
pub trait Connection {
    /// Bound every subsequent `recv`; `None` blocks indefinitely.
    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<(), SocketError>;

    /// Read whatever the peer has sent, up to `buf.len()` bytes.
    ///
    /// `Ok(0)` means the peer closed its side.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, SocketError>;

    /// Write all of `data`.
    fn send(&mut self, data: &[u8]) -> Result<(), SocketError>;

    /// Orderly shutdown of the receive side.  The socket itself is
    /// closed when the connection is dropped.
    fn shutdown(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Binary status output.  Last writer wins.
pub trait IndicatorPort {
    fn set_level(&self, on: bool);

    /// Last level written by any task.
    fn level(&self) -> bool;
}

impl<T: IndicatorPort + ?Sized> IndicatorPort for Arc<T> {
    fn set_level(&self, on: bool) {
        (**self).set_level(on);
    }

    fn level(&self) -> bool {
        (**self).level()
    }
}

// ───────────────────────────────────────────────────────────────
// Station table port (driven adapter: access point → domain)
// ───────────────────────────────────────────────────────────────

/// Synchronous snapshot of the stations currently associated with the
/// access point, each paired with its leased address.
pub trait StationTable {
    fn stations(&self) -> Result<StationList, ApError>;
}

impl<T: StationTable + ?Sized> StationTable for Arc<T> {
    fn stations(&self) -> Result<StationList, ApError> {
        (**self).stations()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
