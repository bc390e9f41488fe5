//! Task wiring: all three tasks start, and the blink task shares the
//! indicator with the command service.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use ledlink::adapters::access_point::SimAccessPoint;
use ledlink::config::{RestartPolicy, SystemConfig};
use ledlink::drivers::indicator::{Indicator, SimPin};
use ledlink::error::SocketError;
use ledlink::events::NotificationBus;
use ledlink::runtime;

use crate::mock_net::{FakeFactory, NetCall, Plan, Step};

#[test]
fn spawn_all_runs_service_and_blinker() {
    let mut config = SystemConfig::default();
    config.server.restart_policy = RestartPolicy::Terminate;
    config.indicator.blink_half_period_ms = 5;

    let bus = Arc::new(NotificationBus::new());
    let ap = Arc::new(SimAccessPoint::start(&config.access_point, Arc::clone(&bus)).unwrap());
    let led = Arc::new(Indicator::new(SimPin::new()));
    let stop = Arc::new(AtomicBool::new(false));
    let (factory, log) = FakeFactory::new(vec![
        Plan::client(vec![Step::Data(b"1"), Step::Close]),
        Plan::ListenFails(SocketError::Bind(98)),
    ]);

    let handles = runtime::spawn_all(
        &config,
        Arc::clone(&bus),
        factory,
        Arc::clone(&led),
        Arc::clone(&ap),
        Arc::clone(&stop),
    )
    .unwrap();

    handles.service.join().unwrap();
    assert_eq!(log.sent(), ["Led turned on"]);
    assert_eq!(log.count(|c| matches!(c, NetCall::Listen { .. })), 2);

    thread::sleep(Duration::from_millis(40));
    stop.store(true, Ordering::Relaxed);
    handles.blink.expect("blink enabled").join().unwrap();

    // Startup low + command + at least a few blink writes.
    assert!(led.with_pin(SimPin::writes) > 4);
    assert!(!handles.monitor.is_finished());
}

#[test]
fn blink_disabled_spawns_no_blink_task() {
    let mut config = SystemConfig::default();
    config.server.restart_policy = RestartPolicy::Terminate;
    config.indicator.blink_enabled = false;

    let bus = Arc::new(NotificationBus::new());
    let ap = Arc::new(SimAccessPoint::start(&config.access_point, Arc::clone(&bus)).unwrap());
    let (factory, _log) = FakeFactory::new(vec![]);

    let handles = runtime::spawn_all(
        &config,
        bus,
        factory,
        Arc::new(Indicator::new(SimPin::new())),
        ap,
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap();

    assert!(handles.blink.is_none());
    handles.service.join().unwrap();
}
