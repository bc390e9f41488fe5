//! Log routing: the command service reports lifecycle steps as events and
//! leaves the console lines to [`LogEventSink`].
//!
//! The logger is process-global, so records are filtered by the thread
//! that produced them.

use std::sync::{Arc, Mutex, Once};
use std::thread::{self, ThreadId};

use log::{LevelFilter, Log, Metadata, Record};

use ledlink::adapters::log_sink::LogEventSink;
use ledlink::app::service::CommandService;
use ledlink::config::{RestartPolicy, ServerConfig};
use ledlink::drivers::indicator::{Indicator, SimPin};
use ledlink::events::{NetEvent, NotificationBus};

use crate::mock_net::{FakeFactory, Plan, Step};

const SERVICE_TARGET: &str = "ledlink::app::service";
const SINK_TARGET: &str = "ledlink::adapters::log_sink";

struct Line {
    thread: ThreadId,
    target: String,
    message: String,
}

struct CaptureLogger;

static LINES: Mutex<Vec<Line>> = Mutex::new(Vec::new());
static CAPTURE: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let line = Line {
            thread: thread::current().id(),
            target: record.target().to_owned(),
            message: record.args().to_string(),
        };
        if let Ok(mut lines) = LINES.lock() {
            lines.push(line);
        }
    }

    fn flush(&self) {}
}

fn install() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

/// `(target, message)` pairs logged so far by the calling thread.
fn my_lines() -> Vec<(String, String)> {
    let me = thread::current().id();
    LINES
        .lock()
        .unwrap()
        .iter()
        .filter(|l| l.thread == me)
        .map(|l| (l.target.clone(), l.message.clone()))
        .collect()
}

fn count(lines: &[(String, String)], target: &str, pred: impl Fn(&str) -> bool) -> usize {
    lines
        .iter()
        .filter(|(t, m)| t == target && pred(m))
        .count()
}

#[test]
fn each_lifecycle_step_is_logged_once() {
    install();

    let bus = Arc::new(NotificationBus::new());
    bus.set(NetEvent::ApStarted);
    let (factory, _) = FakeFactory::new(vec![Plan::client(vec![Step::Data(b"1"), Step::Close])]);
    let led = Arc::new(Indicator::new(SimPin::new()));
    let config = ServerConfig {
        restart_policy: RestartPolicy::Terminate,
        ..ServerConfig::default()
    };
    CommandService::new(bus, factory, led, config).run(&mut LogEventSink::new());

    let lines = my_lines();

    // The service itself only notes what no event covers.
    let service_lines: Vec<_> = lines
        .iter()
        .filter(|(t, _)| t == SERVICE_TARGET)
        .map(|(_, m)| m.as_str())
        .collect();
    for msg in &service_lines {
        assert!(
            msg.starts_with("TCP: waiting for access point")
                || msg.starts_with("TCP: access point started")
                || msg.starts_with("TCP: received"),
            "unexpected service line: {msg}"
        );
    }

    assert_eq!(count(&lines, SINK_TARGET, |m| m.starts_with("TCP | listening")), 1);
    assert_eq!(count(&lines, SINK_TARGET, |m| m.ends_with("accepted")), 1);
    assert_eq!(count(&lines, SINK_TARGET, |m| m == "TCP | client closed connection"), 1);
    assert_eq!(count(&lines, SINK_TARGET, |m| m.starts_with("TCP | service stopped")), 1);
    assert_eq!(count(&lines, SINK_TARGET, |m| m.starts_with("STATE | Listening -> Accepting")), 1);
    assert!(
        lines.iter().all(|(_, m)| !m.contains("Listening -> Accepting") || m.starts_with("STATE |")),
        "state change logged outside the sink"
    );
}
