//! Soft access-point adapter.
//!
//! Brings up the access point, assigns its static address, runs the lease
//! service, and translates radio lifecycle events into
//! [`NotificationBus`] flags.  Also implements [`StationTable`] for the
//! station monitor.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`EspAccessPoint`] over `esp_idf_svc::wifi`
//!   with a router netif (static address, DHCP server on).
//! - **all other targets**: [`SimAccessPoint`], an in-memory station table
//!   with `associate` / `disassociate` hooks for the host simulation and
//!   tests.
//!
//! [`StationTable`]: crate::app::ports::StationTable

use log::info;

use crate::config::{self, AccessPointConfig};
use crate::error::ApError;
use crate::events::{NetEvent, NotificationBus};

#[cfg(target_os = "espidf")]
mod esp_impl;
#[cfg(target_os = "espidf")]
pub use esp_impl::EspAccessPoint;

#[cfg(not(target_os = "espidf"))]
mod sim;
#[cfg(not(target_os = "espidf"))]
pub use sim::SimAccessPoint;

/// Radio lifecycle events relevant to the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioEvent {
    ApStarted,
    ApStopped,
    StationAssociated,
    StationDisassociated,
}

impl RadioEvent {
    /// Bus flag this event raises, if any.
    pub const fn notification(self) -> Option<NetEvent> {
        match self {
            Self::ApStarted => Some(NetEvent::ApStarted),
            Self::StationAssociated => Some(NetEvent::StationConnected),
            Self::StationDisassociated => Some(NetEvent::StationDisconnected),
            Self::ApStopped => None,
        }
    }
}

/// Forward a radio event to the bus.  Called from the radio's event
/// context; never blocks beyond the bus lock.
pub fn dispatch(bus: &NotificationBus, event: RadioEvent) {
    if event == RadioEvent::ApStarted {
        info!("WiFi: access point started");
    }
    if let Some(flag) = event.notification() {
        bus.set(flag);
    }
}

/// Reject credentials the radio would refuse.
pub fn validate(config: &AccessPointConfig) -> Result<(), ApError> {
    config::validate_ssid(&config.ssid).map_err(|_| ApError::InvalidSsid)?;
    config::validate_password(&config.password).map_err(|_| ApError::InvalidPassword)?;
    Ok(())
}
