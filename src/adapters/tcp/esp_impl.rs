//! lwIP socket adapter for ESP-IDF.
//!
//! Compiled only for `target_os = "espidf"`.  Each step of the listening
//! socket's lifecycle is a separate lwIP call so failures carry the exact
//! step and errno, and the backlog reaches `listen()` unchanged.

use core::ffi::c_int;
use core::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use core::time::Duration;

use log::{debug, warn};

use esp_idf_svc::sys::{
    AF_INET, EAGAIN, SHUT_RD, SO_RCVTIMEO, SOCK_STREAM, SOL_SOCKET, in_addr,
    lwip_accept, lwip_bind, lwip_close, lwip_htons, lwip_listen, lwip_recv, lwip_send,
    lwip_setsockopt, lwip_shutdown, lwip_socket, sockaddr_in, socklen_t, timeval,
};

use crate::app::ports::{Connection, Listener, SocketFactory};
use crate::error::SocketError;

fn errno() -> i32 {
    // SAFETY: __errno() returns the pointer to the current task's errno,
    // valid for the lifetime of the task.
    unsafe { *esp_idf_svc::sys::__errno() }
}

/// Owned lwIP descriptor, closed exactly once on drop.
struct Fd(c_int);

impl Drop for Fd {
    fn drop(&mut self) {
        // SAFETY: the descriptor was returned by lwip_socket/lwip_accept
        // and is not shared.
        unsafe {
            lwip_close(self.0);
        }
    }
}

fn sockaddr_from(addr: SocketAddrV4) -> sockaddr_in {
    sockaddr_in {
        sin_len: 0,
        sin_family: AF_INET as _,
        // SAFETY: lwip_htons takes a u16 and returns the network-byte-order value.
        sin_port: unsafe { lwip_htons(addr.port()) },
        sin_addr: in_addr {
            s_addr: u32::from_ne_bytes(addr.ip().octets()),
        },
        sin_zero: [0u8; 8],
    }
}

fn socket_addr_of(raw: &sockaddr_in) -> SocketAddr {
    let ip = Ipv4Addr::from(raw.sin_addr.s_addr.to_ne_bytes());
    SocketAddr::V4(SocketAddrV4::new(ip, u16::from_be(raw.sin_port)))
}

// ── Factory ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct EspSocketFactory;

impl SocketFactory for EspSocketFactory {
    type Listener = EspListener;

    fn listen(&mut self, addr: SocketAddrV4, backlog: u8) -> Result<EspListener, SocketError> {
        // SAFETY: lwIP socket call with valid domain/type/protocol.
        let raw = unsafe { lwip_socket(AF_INET as _, SOCK_STREAM as _, 0) };
        if raw < 0 {
            return Err(SocketError::Create(errno()));
        }
        let fd = Fd(raw);
        debug!("TCP(espidf): socket created");

        let sa = sockaddr_from(addr);
        // SAFETY: `sa` is valid for the bind() call; errors are checked.
        let rc = unsafe {
            lwip_bind(
                fd.0,
                core::ptr::addr_of!(sa).cast(),
                core::mem::size_of::<sockaddr_in>() as _,
            )
        };
        if rc != 0 {
            return Err(SocketError::Bind(errno()));
        }
        debug!("TCP(espidf): socket bound");

        // SAFETY: fd is a bound stream socket.
        let rc = unsafe { lwip_listen(fd.0, c_int::from(backlog)) };
        if rc != 0 {
            return Err(SocketError::Listen(errno()));
        }
        debug!("TCP(espidf): socket listening (backlog {backlog})");

        Ok(EspListener { fd, local: addr })
    }
}

// ── Listener ──────────────────────────────────────────────────────────────────

pub struct EspListener {
    fd: Fd,
    local: SocketAddrV4,
}

impl Listener for EspListener {
    type Connection = EspConnection;

    fn local_addr(&self) -> Option<SocketAddr> {
        Some(SocketAddr::V4(self.local))
    }

    fn accept(&mut self) -> Result<(EspConnection, SocketAddr), SocketError> {
        // SAFETY: sockaddr_in is plain old data; all-zero is a valid value.
        let mut peer: sockaddr_in = unsafe { core::mem::zeroed() };
        let mut len = core::mem::size_of::<sockaddr_in>() as socklen_t;
        // SAFETY: `peer`/`len` outlive the call and describe a buffer of
        // the right size.
        let raw = unsafe {
            lwip_accept(
                self.fd.0,
                core::ptr::addr_of_mut!(peer).cast(),
                &mut len,
            )
        };
        if raw < 0 {
            return Err(SocketError::Accept(errno()));
        }
        Ok((EspConnection { fd: Fd(raw) }, socket_addr_of(&peer)))
    }
}

// ── Connection ────────────────────────────────────────────────────────────────

pub struct EspConnection {
    fd: Fd,
}

impl Connection for EspConnection {
    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<(), SocketError> {
        // A zero timeval means "block forever" to lwIP.
        let t = timeout.unwrap_or(Duration::ZERO);
        let tv = timeval {
            tv_sec: t.as_secs() as _,
            tv_usec: t.subsec_micros() as _,
        };
        // SAFETY: `tv` is valid for the duration of the call.
        let rc = unsafe {
            lwip_setsockopt(
                self.fd.0,
                SOL_SOCKET as _,
                SO_RCVTIMEO as _,
                core::ptr::addr_of!(tv).cast(),
                core::mem::size_of::<timeval>() as _,
            )
        };
        if rc != 0 {
            return Err(SocketError::Receive(errno()));
        }
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
        let n = unsafe { lwip_recv(self.fd.0, buf.as_mut_ptr().cast(), buf.len(), 0) };
        if n < 0 {
            let e = errno();
            // newlib aliases EWOULDBLOCK to EAGAIN.
            if e == EAGAIN as i32 {
                return Err(SocketError::ReceiveTimeout);
            }
            return Err(SocketError::Receive(e));
        }
        Ok(n as usize)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), SocketError> {
        let mut rest = data;
        while !rest.is_empty() {
            // SAFETY: `rest` is valid for reads of `rest.len()` bytes.
            let n = unsafe { lwip_send(self.fd.0, rest.as_ptr().cast(), rest.len(), 0) };
            if n <= 0 {
                return Err(SocketError::Send(errno()));
            }
            rest = &rest[n as usize..];
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        // SAFETY: fd is a connected socket.
        let rc = unsafe { lwip_shutdown(self.fd.0, SHUT_RD as _) };
        if rc != 0 {
            warn!("TCP(espidf): shutdown failed: errno {}", errno());
        }
    }
}
