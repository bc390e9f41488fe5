//! Command service: the single-client TCP state machine.
//!
//! [`CommandService`] owns the listening socket and the client connection
//! for its whole life.  All I/O flows through port traits injected at
//! construction, making the entire loop testable with scripted sockets.
//!
//! ```text
//!  AwaitingReady ──▶ Listening ──▶ Accepting ──▶ Serving
//!                       ▲              │            │
//!                       │              ▼            ▼
//!                       └────────── ErrorRestart ◀──┘
//!                                      │ (policy gives up)
//!                                      ▼
//!                                   Stopped
//! ```
//!
//! Each pass through `Listening` builds a brand-new socket; the previous
//! connection and listener are always dropped first, so there is never
//! more than one of each.

use std::sync::Arc;
use std::thread;

use core::time::Duration;

use log::{debug, info};

use crate::config::{RX_BUFFER_LEN, RestartPolicy, ServerConfig};
use crate::error::SocketError;
use crate::events::{NetEvent, NotificationBus};

use super::commands::Command;
use super::events::{AppEvent, CloseReason};
use super::ports::{Connection, EventSink, IndicatorPort, Listener, SocketFactory};

/// Lifecycle states of the command service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Waiting for the access point to come up.
    AwaitingReady,
    /// Building the listening socket.
    Listening,
    /// Blocked in `accept`.
    Accepting,
    /// Exchanging commands with the connected client.
    Serving,
    /// Tearing down before the next `Listening`.
    ErrorRestart,
    /// The restart policy gave up.  Terminal.
    Stopped,
}

// ───────────────────────────────────────────────────────────────
// CommandService
// ───────────────────────────────────────────────────────────────

pub struct CommandService<F, I> {
    bus: Arc<NotificationBus>,
    factory: F,
    indicator: I,
    config: ServerConfig,
    state: ServiceState,
    /// Consecutive listen/accept failures since the last accepted client.
    failures: u32,
}

impl<F: SocketFactory, I: IndicatorPort> CommandService<F, I> {
    pub fn new(bus: Arc<NotificationBus>, factory: F, indicator: I, config: ServerConfig) -> Self {
        Self {
            bus,
            factory,
            indicator,
            config,
            state: ServiceState::AwaitingReady,
            failures: 0,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Run the service until the restart policy gives up.
    ///
    /// Blocks until `ApStarted` is signalled, then serves clients one at a
    /// time forever.  Returns only on a listen/accept failure the policy
    /// will not retry, carrying that failure.
    pub fn run(&mut self, sink: &mut impl EventSink) -> SocketError {
        info!("TCP: waiting for access point");
        self.bus.wait_any(NetEvent::ApStarted.into(), false, None);
        info!("TCP: access point started");

        loop {
            if let Err(err) = self.cycle(sink) {
                if !self.recover(err, sink) {
                    self.transition(ServiceState::Stopped, sink);
                    sink.emit(&AppEvent::Stopped(err));
                    return err;
                }
            }
        }
    }

    /// One listen → accept → serve → teardown pass.
    fn cycle(&mut self, sink: &mut impl EventSink) -> Result<(), SocketError> {
        self.transition(ServiceState::Listening, sink);
        let mut listener = self
            .factory
            .listen(self.config.bind_addr(), self.config.backlog)?;
        sink.emit(&AppEvent::Listening {
            local: listener.local_addr(),
        });

        self.transition(ServiceState::Accepting, sink);
        let (mut conn, peer) = listener.accept()?;
        self.failures = 0;
        sink.emit(&AppEvent::ClientAccepted { peer });

        self.transition(ServiceState::Serving, sink);
        let reason = self.serve(&mut conn, sink);

        self.transition(ServiceState::ErrorRestart, sink);
        conn.shutdown();
        drop(conn);
        drop(listener);
        sink.emit(&AppEvent::ClientClosed { reason });
        Ok(())
    }

    /// Receive loop for one client.  Returns once the connection is no
    /// longer usable.
    fn serve<C: Connection>(&mut self, conn: &mut C, sink: &mut impl EventSink) -> CloseReason {
        if let Some(timeout) = self.config.recv_timeout() {
            if let Err(e) = conn.set_recv_timeout(Some(timeout)) {
                return CloseReason::ReceiveFailed(e);
            }
        }

        let mut rx = [0u8; RX_BUFFER_LEN];
        loop {
            // The last buffer byte is never filled.
            let len = match conn.recv(&mut rx[..RX_BUFFER_LEN - 1]) {
                Ok(0) => return CloseReason::PeerClosed,
                Ok(n) => n,
                Err(e) => return CloseReason::ReceiveFailed(e),
            };

            let payload = &rx[..len];
            debug!("TCP: received {len} bytes: {:?}", String::from_utf8_lossy(payload));

            let command = Command::decode(payload);
            self.indicator.set_level(command.level());
            sink.emit(&AppEvent::CommandApplied { command, bytes: len });

            if let Err(e) = conn.send(command.reply().as_bytes()) {
                return CloseReason::SendFailed(e);
            }
        }
    }

    /// Apply the restart policy to a listen/accept failure.  Returns
    /// `false` when the service should stop.
    fn recover(&mut self, err: SocketError, sink: &mut impl EventSink) -> bool {
        sink.emit(&AppEvent::SocketFailed(err));
        self.transition(ServiceState::ErrorRestart, sink);
        self.failures = self.failures.saturating_add(1);

        match self.config.restart_policy {
            RestartPolicy::Terminate => false,
            RestartPolicy::Retry {
                initial_backoff_ms,
                max_backoff_ms,
                max_attempts,
            } => {
                if max_attempts.is_some_and(|limit| self.failures > limit) {
                    return false;
                }
                let delay = backoff_delay(initial_backoff_ms, max_backoff_ms, self.failures);
                sink.emit(&AppEvent::RetryScheduled {
                    attempt: self.failures,
                    delay,
                });
                thread::sleep(delay);
                true
            }
        }
    }

    fn transition(&mut self, to: ServiceState, sink: &mut impl EventSink) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        sink.emit(&AppEvent::StateChanged { from, to });
    }
}

/// Delay before the `attempt`-th consecutive retry (1-based): the initial
/// backoff doubled per prior attempt, capped at `max_ms`.
pub fn backoff_delay(initial_ms: u32, max_ms: u32, attempt: u32) -> Duration {
    let factor = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    let ms = u64::from(initial_ms)
        .saturating_mul(factor)
        .min(u64::from(max_ms));
    Duration::from_millis(ms)
}
