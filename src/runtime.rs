//! Task wiring shared by the firmware and the host simulation.
//!
//! Three independently scheduled tasks, with no ordering between them:
//!
//! | Task          | Owns                       | Blocks on                      |
//! |---------------|----------------------------|--------------------------------|
//! | `tcp_server`  | listener, client connection| `ApStarted`, accept, receive   |
//! | `sta_monitor` | -                          | station bits on the bus        |
//! | `blink`       | -                          | its own sleep                  |

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::JoinHandle;

use log::info;

use crate::adapters::log_sink::LogEventSink;
use crate::app::monitor::StationMonitor;
use crate::app::ports::{IndicatorPort, SocketFactory, StationTable};
use crate::app::service::CommandService;
use crate::config::SystemConfig;
use crate::drivers::blink::Blinker;
use crate::drivers::task_pin::{self, Core, TaskSpec};
use crate::events::NotificationBus;

pub const SERVICE_TASK: TaskSpec = TaskSpec {
    name: "tcp_server\0",
    core: Core::App,
    priority: 5,
    stack_kb: 8,
};

pub const MONITOR_TASK: TaskSpec = TaskSpec {
    name: "sta_monitor\0",
    core: Core::App,
    priority: 5,
    stack_kb: 6,
};

pub const BLINK_TASK: TaskSpec = TaskSpec {
    name: "blink\0",
    core: Core::App,
    priority: 5,
    stack_kb: 4,
};

pub struct Handles {
    /// Finishes only when the restart policy gives up.
    pub service: JoinHandle<()>,
    /// Never finishes.
    pub monitor: JoinHandle<()>,
    /// Present when blinking is enabled; finishes once `stop` is raised.
    pub blink: Option<JoinHandle<()>>,
}

/// Spawn the command service, the station monitor and (if enabled) the
/// blink task.  Events from both domain tasks go to the log.
pub fn spawn_all<F, I, Q>(
    config: &SystemConfig,
    bus: Arc<NotificationBus>,
    factory: F,
    indicator: Arc<I>,
    table: Q,
    stop_blink: Arc<AtomicBool>,
) -> io::Result<Handles>
where
    F: SocketFactory + Send + 'static,
    I: IndicatorPort + Send + Sync + 'static,
    Q: StationTable + Send + 'static,
{
    let service = {
        let mut service = CommandService::new(
            Arc::clone(&bus),
            factory,
            Arc::clone(&indicator),
            config.server.clone(),
        );
        task_pin::spawn(SERVICE_TASK, move || {
            service.run(&mut LogEventSink::new());
            info!("TCP: task exiting");
        })?
    };

    let monitor = {
        let monitor = StationMonitor::new(bus, table);
        task_pin::spawn(MONITOR_TASK, move || {
            monitor.run(&mut LogEventSink::new());
        })?
    };

    let blink = if config.indicator.blink_enabled {
        let blinker = Blinker::new(config.indicator.blink_half_period());
        Some(task_pin::spawn(BLINK_TASK, move || {
            blinker.run(&indicator, &stop_blink);
        })?)
    } else {
        None
    };

    Ok(Handles {
        service,
        monitor,
        blink,
    })
}
