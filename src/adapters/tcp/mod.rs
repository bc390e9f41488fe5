//! TCP socket adapters.
//!
//! Implements [`SocketFactory`], [`Listener`] and [`Connection`] for the
//! command service.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: [`EspSocketFactory`] drives lwIP directly
//!   (`lwip_socket` / `lwip_bind` / `lwip_listen`) so the pending-connection
//!   backlog is honoured exactly.
//! - **all targets**: [`StdSocketFactory`] over `std::net`, used by the host
//!   simulation and the loopback tests.  `std` does not expose the listen
//!   backlog; the single-client guarantee comes from the service never
//!   accepting while a connection is alive.

use core::net::{SocketAddr, SocketAddrV4};
use core::time::Duration;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};

use log::debug;

use crate::app::ports::{Connection, Listener, SocketFactory};
use crate::error::SocketError;

#[cfg(target_os = "espidf")]
mod esp_impl;
#[cfg(target_os = "espidf")]
pub use esp_impl::{EspConnection, EspListener, EspSocketFactory};

fn os_errno(e: &io::Error) -> i32 {
    e.raw_os_error().unwrap_or(-1)
}

// ───────────────────────────────────────────────────────────────
// std::net adapter
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct StdSocketFactory;

impl SocketFactory for StdSocketFactory {
    type Listener = StdListener;

    fn listen(&mut self, addr: SocketAddrV4, backlog: u8) -> Result<StdListener, SocketError> {
        // `bind` performs socket + bind + listen in one call; a failure in
        // any of them surfaces here.
        let listener = TcpListener::bind(addr).map_err(|e| SocketError::Bind(os_errno(&e)))?;
        debug!("TCP(std): bound {addr} (requested backlog {backlog})");
        Ok(StdListener(listener))
    }
}

#[derive(Debug)]
pub struct StdListener(TcpListener);

impl Listener for StdListener {
    type Connection = StdConnection;

    fn local_addr(&self) -> Option<SocketAddr> {
        self.0.local_addr().ok()
    }

    fn accept(&mut self) -> Result<(StdConnection, SocketAddr), SocketError> {
        let (stream, peer) = self
            .0
            .accept()
            .map_err(|e| SocketError::Accept(os_errno(&e)))?;
        Ok((StdConnection(stream), peer))
    }
}

#[derive(Debug)]
pub struct StdConnection(TcpStream);

impl Connection for StdConnection {
    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<(), SocketError> {
        self.0
            .set_read_timeout(timeout)
            .map_err(|e| SocketError::Receive(os_errno(&e)))
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        loop {
            match self.0.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other.map_err(|e| SocketError::from_recv(&e)),
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), SocketError> {
        self.0
            .write_all(data)
            .map_err(|e| SocketError::Send(os_errno(&e)))
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.0.shutdown(Shutdown::Read) {
            debug!("TCP(std): shutdown: {e}");
        }
    }
}
