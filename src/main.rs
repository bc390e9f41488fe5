//! LedLink Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  AccessPoint         Tcp sockets       Indicator   LogSink   │
//! │  (radio → bus,       (SocketFactory)   (GPIO 18)   (events)  │
//! │   StationTable)                                              │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌───────────────────┐   ┌─────────────────┐                 │
//! │  │  CommandService   │   │ StationMonitor  │   Blinker       │
//! │  └───────────────────┘   └─────────────────┘                 │
//! │            ▲    NotificationBus     ▲                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! On ESP-IDF this boots the real firmware.  On any other target it runs a
//! host simulation: the command socket listens on `0.0.0.0:3000` and one
//! simulated station associates with the access point.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result, anyhow};
use log::{error, info};

use ledlink::config::SystemConfig;
use ledlink::drivers::indicator::Indicator;
use ledlink::events::NotificationBus;
use ledlink::runtime::{self, Handles};

// ── Main (ESP-IDF) ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use ledlink::adapters::access_point::EspAccessPoint;
    use ledlink::adapters::tcp::EspSocketFactory;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    banner();

    let config = SystemConfig::default();
    config.validate().context("built-in configuration invalid")?;

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().context("NVS init failed")?;

    // ── 2. Notification bus + access point ────────────────────
    let bus = Arc::new(NotificationBus::new());
    let ap = EspAccessPoint::start(
        peripherals.modem,
        sysloop,
        nvs,
        &config.access_point,
        Arc::clone(&bus),
    )
    .context("access point bring-up failed")?;

    // ── 3. Indicator (GPIO 18, push-pull output) ──────────────
    let pin = PinDriver::output(peripherals.pins.gpio18)?;
    let indicator = Arc::new(Indicator::new(pin));

    // ── 4. Tasks ──────────────────────────────────────────────
    let handles = runtime::spawn_all(
        &config,
        bus,
        EspSocketFactory,
        indicator,
        Arc::new(ap),
        Arc::new(AtomicBool::new(false)),
    )?;

    supervise(handles)
}

// ── Main (host simulation) ────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use ledlink::adapters::access_point::SimAccessPoint;
    use ledlink::adapters::tcp::StdSocketFactory;
    use ledlink::drivers::indicator::SimPin;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    banner();

    let config = SystemConfig::default();
    config.validate().context("built-in configuration invalid")?;

    let bus = Arc::new(NotificationBus::new());
    let ap = Arc::new(
        SimAccessPoint::start(&config.access_point, Arc::clone(&bus))
            .context("access point bring-up failed")?,
    );
    let indicator = Arc::new(Indicator::new(SimPin::new()));

    let handles = runtime::spawn_all(
        &config,
        bus,
        StdSocketFactory,
        indicator,
        Arc::clone(&ap),
        Arc::new(AtomicBool::new(false)),
    )?;

    let ip = ap.associate([0x24, 0x0a, 0xc4, 0x12, 0x34, 0x56])?;
    info!(
        "SIM: station associated as {ip}; try `nc 127.0.0.1 {}`",
        config.server.port
    );

    supervise(handles)
}

fn banner() {
    info!("╔══════════════════════════════════════╗");
    info!("║  LedLink v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
}

/// Wait on the command service; if it gives up, the monitor and blink
/// tasks keep running.
fn supervise(handles: Handles) -> Result<()> {
    handles
        .service
        .join()
        .map_err(|_| anyhow!("command service task panicked"))?;
    error!("Command service stopped; station monitor still running");
    handles
        .monitor
        .join()
        .map_err(|_| anyhow!("station monitor task panicked"))
}
