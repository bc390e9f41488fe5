//! Scripted network and sink adapters for integration tests.
//!
//! [`FakeFactory`] plays back a list of [`Plan`]s, one per listen attempt,
//! and records every socket call so tests can assert on the full lifecycle
//! without touching a real TCP/IP stack.  It also tracks how many
//! listeners and connections are alive and records a violation whenever
//! the service would hold two of either at once.

use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use core::time::Duration;
use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use ledlink::app::events::AppEvent;
use ledlink::app::ports::{Connection, EventSink, Listener, SocketFactory};
use ledlink::app::service::ServiceState;
use ledlink::error::SocketError;

/// errno reported once the script runs out of plans.
pub const EXHAUSTED: i32 = -99;

pub const PEER: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 2), 50_000));

// ── Script ────────────────────────────────────────────────────

/// One receive outcome.
#[derive(Debug, Clone)]
pub enum Step {
    Data(&'static [u8]),
    Close,
    Fail(SocketError),
}

/// What happens on one pass through listen → accept.
#[derive(Debug, Clone)]
pub enum Plan {
    ListenFails(SocketError),
    AcceptFails(SocketError),
    Client { steps: Vec<Step>, send_fails: bool },
}

impl Plan {
    pub fn client(steps: Vec<Step>) -> Self {
        Self::Client {
            steps,
            send_fails: false,
        }
    }
}

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NetCall {
    Listen { addr: SocketAddrV4, backlog: u8 },
    Accept,
    SetTimeout(Option<Duration>),
    Recv,
    Send(Vec<u8>),
    Shutdown,
    ConnectionDropped,
    ListenerDropped,
}

#[derive(Default)]
struct Shared {
    calls: Vec<NetCall>,
    live_listeners: usize,
    live_connections: usize,
    violations: Vec<String>,
}

/// Handle onto the call record shared with every fake socket.
#[derive(Clone, Default)]
pub struct NetLog(Arc<Mutex<Shared>>);

#[allow(dead_code)]
impl NetLog {
    fn with<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        f(&mut self.0.lock().unwrap())
    }

    pub fn calls(&self) -> Vec<NetCall> {
        self.with(|s| s.calls.clone())
    }

    pub fn violations(&self) -> Vec<String> {
        self.with(|s| s.violations.clone())
    }

    pub fn count(&self, pred: impl Fn(&NetCall) -> bool) -> usize {
        self.with(|s| s.calls.iter().filter(|c| pred(c)).count())
    }

    pub fn sent(&self) -> Vec<String> {
        self.with(|s| {
            s.calls
                .iter()
                .filter_map(|c| match c {
                    NetCall::Send(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                    _ => None,
                })
                .collect()
        })
    }

    pub fn live(&self) -> (usize, usize) {
        self.with(|s| (s.live_listeners, s.live_connections))
    }
}

// ── FakeFactory ───────────────────────────────────────────────

pub struct FakeFactory {
    plans: VecDeque<Plan>,
    log: NetLog,
}

impl FakeFactory {
    pub fn new(plans: Vec<Plan>) -> (Self, NetLog) {
        let log = NetLog::default();
        let factory = Self {
            plans: plans.into(),
            log: log.clone(),
        };
        (factory, log)
    }
}

impl SocketFactory for FakeFactory {
    type Listener = FakeListener;

    fn listen(&mut self, addr: SocketAddrV4, backlog: u8) -> Result<FakeListener, SocketError> {
        let plan = self.plans.pop_front();
        self.log.with(|s| {
            s.calls.push(NetCall::Listen { addr, backlog });
            if s.live_listeners > 0 {
                s.violations.push("listen while a listener is alive".into());
            }
            if s.live_connections > 0 {
                s.violations.push("listen while a connection is alive".into());
            }
        });

        match plan {
            None => Err(SocketError::Create(EXHAUSTED)),
            Some(Plan::ListenFails(e)) => Err(e),
            Some(plan) => {
                self.log.with(|s| s.live_listeners += 1);
                Ok(FakeListener {
                    plan: Some(plan),
                    log: self.log.clone(),
                })
            }
        }
    }
}

pub struct FakeListener {
    plan: Option<Plan>,
    log: NetLog,
}

impl Listener for FakeListener {
    type Connection = FakeConnection;

    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }

    fn accept(&mut self) -> Result<(FakeConnection, SocketAddr), SocketError> {
        self.log.with(|s| {
            s.calls.push(NetCall::Accept);
            if s.live_connections > 0 {
                s.violations.push("accept while a connection is alive".into());
            }
        });

        match self.plan.take() {
            Some(Plan::Client { steps, send_fails }) => {
                self.log.with(|s| s.live_connections += 1);
                let conn = FakeConnection {
                    steps: steps.into(),
                    send_fails,
                    log: self.log.clone(),
                };
                Ok((conn, PEER))
            }
            Some(Plan::AcceptFails(e)) => Err(e),
            Some(Plan::ListenFails(_)) | None => Err(SocketError::Accept(EXHAUSTED)),
        }
    }
}

impl Drop for FakeListener {
    fn drop(&mut self) {
        self.log.with(|s| {
            s.live_listeners -= 1;
            s.calls.push(NetCall::ListenerDropped);
        });
    }
}

pub struct FakeConnection {
    steps: VecDeque<Step>,
    send_fails: bool,
    log: NetLog,
}

impl Connection for FakeConnection {
    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<(), SocketError> {
        self.log.with(|s| s.calls.push(NetCall::SetTimeout(timeout)));
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        self.log.with(|s| s.calls.push(NetCall::Recv));
        match self.steps.pop_front() {
            Some(Step::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Some(Step::Fail(e)) => Err(e),
            Some(Step::Close) | None => Ok(0),
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), SocketError> {
        self.log.with(|s| s.calls.push(NetCall::Send(data.to_vec())));
        if self.send_fails {
            Err(SocketError::Send(32))
        } else {
            Ok(())
        }
    }

    fn shutdown(&mut self) {
        self.log.with(|s| s.calls.push(NetCall::Shutdown));
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.log.with(|s| {
            s.live_connections -= 1;
            s.calls.push(NetCall::ConnectionDropped);
        });
    }
}

// ── Sinks ─────────────────────────────────────────────────────

/// Collects events in memory for single-threaded tests.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target state of every transition, in order.
    pub fn states(&self) -> Vec<ServiceState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// Forwards events to another thread.
pub struct ChannelSink(pub Sender<AppEvent>);

impl EventSink for ChannelSink {
    fn emit(&mut self, event: &AppEvent) {
        // The receiving test may already be done.
        let _ = self.0.send(event.clone());
    }
}
