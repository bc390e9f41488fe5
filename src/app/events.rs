//! Outbound application events.
//!
//! The [`CommandService`](super::service::CommandService) and
//! [`StationMonitor`](super::monitor::StationMonitor) emit these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use core::fmt;
use core::net::{Ipv4Addr, SocketAddr};
use core::time::Duration;

use crate::error::{ApError, SocketError};

use super::commands::Command;
use super::monitor::StationChange;
use super::service::ServiceState;

/// Upper bound on stations reported per query.
pub const MAX_STATIONS: usize = 16;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The command service moved between lifecycle states.
    StateChanged { from: ServiceState, to: ServiceState },

    /// A fresh listening socket is bound.
    Listening { local: Option<SocketAddr> },

    /// A client connection was accepted.
    ClientAccepted { peer: SocketAddr },

    /// A received command was applied to the indicator.
    CommandApplied { command: Command, bytes: usize },

    /// The client connection was torn down.
    ClientClosed { reason: CloseReason },

    /// Building the listening socket or accepting failed.
    SocketFailed(SocketError),

    /// The service will rebuild its socket after `delay`.
    RetryScheduled { attempt: u32, delay: Duration },

    /// The command service gave up; carries the final failure.
    Stopped(SocketError),

    /// Station associations changed; carries a fresh table snapshot.
    StationsChanged {
        change: StationChange,
        stations: StationList,
    },

    /// The station table could not be read.
    StationQueryFailed(ApError),
}

/// Why a client connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Receive returned zero bytes.
    PeerClosed,
    /// Receive failed or timed out.
    ReceiveFailed(SocketError),
    /// Writing the reply failed.
    SendFailed(SocketError),
}

/// One associated station and the address leased to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationRecord {
    pub mac: [u8; 6],
    pub ip: Ipv4Addr,
}

pub type StationList = heapless::Vec<StationRecord, MAX_STATIONS>;

impl fmt::Display for StationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.mac;
        write!(
            f,
            "mac: {a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x} - IP: {}",
            self.ip
        )
    }
}
