//! Station monitor: reports association changes on the access point.
//!
//! Waits on the station bits of the [`NotificationBus`], consuming them,
//! and reports a freshly enumerated station table on every wake-up.  It
//! never touches the command socket or the indicator.

use core::time::Duration;
use std::sync::Arc;

use log::{info, warn};

use crate::events::{EventSet, NetEvent, NotificationBus};

use super::events::AppEvent;
use super::ports::{EventSink, StationTable};

/// What woke the monitor.  Both kinds can coalesce into one wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationChange {
    Connected,
    Disconnected,
    ConnectedAndDisconnected,
}

impl StationChange {
    /// Classify an observed event set; `None` if it holds no station bits.
    pub fn from_events(events: EventSet) -> Option<Self> {
        match (
            events.contains(NetEvent::StationConnected),
            events.contains(NetEvent::StationDisconnected),
        ) {
            (true, true) => Some(Self::ConnectedAndDisconnected),
            (true, false) => Some(Self::Connected),
            (false, true) => Some(Self::Disconnected),
            (false, false) => None,
        }
    }
}

pub struct StationMonitor<Q> {
    bus: Arc<NotificationBus>,
    table: Q,
}

impl<Q: StationTable> StationMonitor<Q> {
    pub fn new(bus: Arc<NotificationBus>, table: Q) -> Self {
        Self { bus, table }
    }

    /// Wait for one association change (or `timeout`) and report the
    /// current station table.  Returns `None` on timeout.
    pub fn wait_and_report(
        &self,
        timeout: Option<Duration>,
        sink: &mut impl EventSink,
    ) -> Option<StationChange> {
        let events = self
            .bus
            .wait_any(EventSet::STATION_CHANGES, true, timeout);
        let change = StationChange::from_events(events)?;

        match change {
            StationChange::Connected => info!("Monitor: new station connected"),
            StationChange::Disconnected => info!("Monitor: a station disconnected"),
            StationChange::ConnectedAndDisconnected => {
                info!("Monitor: stations connected and disconnected");
            }
        }

        match self.table.stations() {
            Ok(stations) => sink.emit(&AppEvent::StationsChanged { change, stations }),
            Err(e) => {
                warn!("Monitor: station table query failed: {e}");
                sink.emit(&AppEvent::StationQueryFailed(e));
            }
        }
        Some(change)
    }

    /// Report association changes forever.
    pub fn run(&self, sink: &mut impl EventSink) -> ! {
        info!("Monitor: started");
        loop {
            self.wait_and_report(None, sink);
        }
    }
}
