//! Host simulation of the access point.
//!
//! Stations "associate" by MAC address and receive a lease from the pool
//! starting at `lease_start`.  Every association change is dispatched to
//! the bus exactly as the radio would.

use core::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;

use crate::app::events::{StationList, StationRecord};
use crate::app::ports::StationTable;
use crate::config::AccessPointConfig;
use crate::error::ApError;
use crate::events::NotificationBus;

use super::{RadioEvent, dispatch, validate};

pub struct SimAccessPoint {
    config: AccessPointConfig,
    bus: Arc<NotificationBus>,
    stations: Mutex<StationList>,
}

impl SimAccessPoint {
    /// Validate credentials, "bring up" the AP and signal `ApStarted`.
    pub fn start(config: &AccessPointConfig, bus: Arc<NotificationBus>) -> Result<Self, ApError> {
        validate(config)?;
        info!(
            "WiFi(sim): AP '{}' on {}/{} (max {} stations)",
            config.ssid,
            config.ip(),
            config.prefix_len,
            config.max_connections
        );
        let ap = Self {
            config: config.clone(),
            bus,
            stations: Mutex::new(StationList::new()),
        };
        dispatch(&ap.bus, RadioEvent::ApStarted);
        Ok(ap)
    }

    /// Associate a station and lease it the lowest free address.
    /// Re-associating a known station keeps its lease.
    pub fn associate(&self, mac: [u8; 6]) -> Result<Ipv4Addr, ApError> {
        let mut stations = self.lock();
        let ip = match stations.iter().find(|s| s.mac == mac) {
            Some(existing) => existing.ip,
            None => {
                if stations.len() >= usize::from(self.config.max_connections) {
                    return Err(ApError::TableFull);
                }
                let ip = (0..)
                    .map_while(|i| self.config.lease_addr(i))
                    .find(|ip| stations.iter().all(|s| s.ip != *ip))
                    .ok_or(ApError::TableFull)?;
                stations
                    .push(StationRecord { mac, ip })
                    .map_err(|_| ApError::TableFull)?;
                ip
            }
        };
        drop(stations);

        dispatch(&self.bus, RadioEvent::StationAssociated);
        Ok(ip)
    }

    /// Drop a station and release its lease.  Returns `false` if it was
    /// not associated.
    pub fn disassociate(&self, mac: [u8; 6]) -> bool {
        let mut stations = self.lock();
        let Some(pos) = stations.iter().position(|s| s.mac == mac) else {
            return false;
        };
        stations.remove(pos);
        drop(stations);

        dispatch(&self.bus, RadioEvent::StationDisassociated);
        true
    }

    fn lock(&self) -> MutexGuard<'_, StationList> {
        self.stations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StationTable for SimAccessPoint {
    fn stations(&self) -> Result<StationList, ApError> {
        Ok(self.lock().clone())
    }
}
