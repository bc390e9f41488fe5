//! ESP-IDF soft-AP bring-up.
//!
//! Compiled only for `target_os = "espidf"`.  The AP netif is created with
//! a static router address and the DHCP server enabled *before* the radio
//! starts, and the Wi-Fi event subscription is registered before
//! `start()`, so `ApStarted` is never missed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use core::net::Ipv4Addr;

use log::{info, warn};

use esp_idf_svc::eventloop::{EspSubscription, EspSystemEventLoop, System};
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::ipv4::{self, Mask, RouterConfiguration, Subnet};
use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::{
    EspError, esp, esp_ip4_addr_t, esp_netif_dhcps_get_clients_by_mac, esp_netif_pair_mac_ip_t,
    esp_wifi_ap_get_sta_list, esp_wifi_get_config, esp_wifi_set_config, wifi_config_t,
    wifi_interface_t_WIFI_IF_AP, wifi_sta_list_t,
};
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi, WifiDriver,
    WifiEvent,
};

use crate::app::events::{StationList, StationRecord};
use crate::app::ports::StationTable;
use crate::config::AccessPointConfig;
use crate::error::ApError;
use crate::events::NotificationBus;

use super::{RadioEvent, dispatch, validate};

fn driver_err(e: EspError) -> ApError {
    ApError::Driver(e.code())
}

struct Inner {
    wifi: BlockingWifi<EspWifi<'static>>,
    _events: EspSubscription<'static, System>,
}

pub struct EspAccessPoint {
    inner: Mutex<Inner>,
}

impl EspAccessPoint {
    /// Configure and start the soft-AP.  Returns once the AP netif is up.
    pub fn start(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &AccessPointConfig,
        bus: Arc<NotificationBus>,
    ) -> Result<Self, ApError> {
        validate(config)?;

        let driver = WifiDriver::new(modem, sysloop.clone(), Some(nvs)).map_err(driver_err)?;

        let ap_netif = EspNetif::new_with_conf(&NetifConfiguration {
            ip_configuration: Some(ipv4::Configuration::Router(RouterConfiguration {
                subnet: Subnet {
                    gateway: config.ip(),
                    mask: Mask(config.prefix_len),
                },
                dhcp_enabled: true,
                dns: None,
                secondary_dns: None,
            })),
            ..NetifConfiguration::wifi_default_router()
        })
        .map_err(driver_err)?;
        info!("WiFi: static address {}/{}, DHCP server on", config.ip(), config.prefix_len);

        let sta_netif = EspNetif::new(NetifStack::Sta).map_err(driver_err)?;
        let esp_wifi = EspWifi::wrap_all(driver, sta_netif, ap_netif).map_err(driver_err)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop.clone()).map_err(driver_err)?;

        let auth_method = if config.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
            ssid: config
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ApError::InvalidSsid)?,
            password: config
                .password
                .as_str()
                .try_into()
                .map_err(|_| ApError::InvalidPassword)?,
            auth_method,
            channel: config.channel,
            ssid_hidden: config.ssid_hidden,
            max_connections: u16::from(config.max_connections),
            ..Default::default()
        }))
        .map_err(driver_err)?;
        set_beacon_interval(config.beacon_interval).map_err(driver_err)?;

        let events = sysloop
            .subscribe::<WifiEvent, _>(move |event| {
                let radio = match event {
                    WifiEvent::ApStarted { .. } => RadioEvent::ApStarted,
                    WifiEvent::ApStopped { .. } => RadioEvent::ApStopped,
                    WifiEvent::ApStaConnected { .. } => RadioEvent::StationAssociated,
                    WifiEvent::ApStaDisconnected { .. } => RadioEvent::StationDisassociated,
                    _ => return,
                };
                dispatch(&bus, radio);
            })
            .map_err(driver_err)?;

        wifi.start().map_err(driver_err)?;
        info!(
            "WiFi: AP '{}' started (channel {}, max {} stations)",
            config.ssid, config.channel, config.max_connections
        );

        Ok(Self {
            inner: Mutex::new(Inner {
                wifi,
                _events: events,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `AccessPointConfiguration` has no beacon field; patch the raw config.
fn set_beacon_interval(interval: u16) -> Result<(), EspError> {
    // SAFETY: wifi_config_t is plain old data; the driver fills it in.
    let mut raw: wifi_config_t = unsafe { core::mem::zeroed() };
    esp!(unsafe { esp_wifi_get_config(wifi_interface_t_WIFI_IF_AP, &mut raw) })?;
    // SAFETY: the AP interface's config is the `ap` member of the union.
    unsafe {
        raw.ap.beacon_interval = interval;
    }
    esp!(unsafe { esp_wifi_set_config(wifi_interface_t_WIFI_IF_AP, &mut raw) })
}

impl StationTable for EspAccessPoint {
    fn stations(&self) -> Result<StationList, ApError> {
        let inner = self.lock();
        let netif = inner.wifi.wifi().ap_netif().handle();

        // SAFETY: wifi_sta_list_t is plain old data; the driver fills it in.
        let mut sta_list: wifi_sta_list_t = unsafe { core::mem::zeroed() };
        esp!(unsafe { esp_wifi_ap_get_sta_list(&mut sta_list) }).map_err(driver_err)?;

        let count = usize::try_from(sta_list.num).unwrap_or(0);
        let mut out = StationList::new();
        for sta in sta_list.sta.iter().take(count) {
            let mut pair = esp_netif_pair_mac_ip_t {
                mac: sta.mac,
                ip: esp_ip4_addr_t { addr: 0 },
            };
            // SAFETY: `netif` is the live AP netif and `pair` is valid for
            // one element.
            esp!(unsafe { esp_netif_dhcps_get_clients_by_mac(netif, 1, &mut pair) })
                .map_err(driver_err)?;

            // lwIP stores the address in network order.
            let ip = Ipv4Addr::from(pair.ip.addr.to_le_bytes());
            if out.push(StationRecord { mac: sta.mac, ip }).is_err() {
                warn!("WiFi: station table truncated at {}", out.len());
                break;
            }
        }
        Ok(out)
    }
}
