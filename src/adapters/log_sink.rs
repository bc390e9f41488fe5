//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (ESP-IDF console in production, `env_logger` on the host).

use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, CloseReason, StationList};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Listening { local } => match local {
                Some(addr) => info!("TCP | listening on {addr}"),
                None => info!("TCP | listening"),
            },
            AppEvent::ClientAccepted { peer } => {
                info!("TCP | client {peer} accepted");
            }
            AppEvent::CommandApplied { command, bytes } => {
                info!("CMD | {:?} ({} bytes) -> \"{}\"", command, bytes, command.reply());
            }
            AppEvent::ClientClosed { reason } => match reason {
                CloseReason::PeerClosed => info!("TCP | client closed connection"),
                CloseReason::ReceiveFailed(e) | CloseReason::SendFailed(e) => {
                    warn!("TCP | client dropped: {e}");
                }
            },
            AppEvent::SocketFailed(e) => {
                error!("TCP | {e}");
            }
            AppEvent::RetryScheduled { attempt, delay } => {
                warn!("TCP | retry #{attempt} in {} ms", delay.as_millis());
            }
            AppEvent::Stopped(e) => {
                error!("TCP | service stopped: {e}");
            }
            AppEvent::StationsChanged { change, stations } => {
                info!("STA | {:?}", change);
                log_station_table(stations);
            }
            AppEvent::StationQueryFailed(e) => {
                warn!("STA | query failed: {e}");
            }
        }
    }
}

fn log_station_table(stations: &StationList) {
    info!("Connected stations:");
    info!("--------------------------------------------------");
    for (i, station) in stations.iter().enumerate() {
        info!("{} - {}", i + 1, station);
    }
}
