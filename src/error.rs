//! Error types for the LedLink firmware.
//!
//! Every socket failure is tagged with the lifecycle step that produced it,
//! so the command service can tell a fatal-per-iteration failure (create,
//! bind, listen, accept) from a recoverable per-connection one (receive,
//! send).  All variants are `Copy` and carry the raw platform errno
//! (`-1` when the platform did not report one).

use core::fmt;

// ---------------------------------------------------------------------------
// Socket errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketError {
    /// `socket()` failed.
    Create(i32),
    /// `bind()` failed (port in use, address unavailable, ...).
    Bind(i32),
    /// `listen()` failed.
    Listen(i32),
    /// `accept()` failed.
    Accept(i32),
    /// `recv()` returned an error.
    Receive(i32),
    /// `recv()` hit the configured receive timeout.
    ReceiveTimeout,
    /// Writing the reply failed.
    Send(i32),
}

impl SocketError {
    /// Failures in the listening-socket lifecycle end the current service
    /// iteration; everything else only ends the current connection.
    pub const fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::Create(_) | Self::Bind(_) | Self::Listen(_) | Self::Accept(_)
        )
    }

    /// Raw platform errno, if any.
    pub const fn errno(self) -> Option<i32> {
        match self {
            Self::Create(e)
            | Self::Bind(e)
            | Self::Listen(e)
            | Self::Accept(e)
            | Self::Receive(e)
            | Self::Send(e) => Some(e),
            Self::ReceiveTimeout => None,
        }
    }

    /// Map a std I/O error to a receive-side failure.
    pub fn from_recv(e: &std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                Self::ReceiveTimeout
            }
            _ => Self::Receive(e.raw_os_error().unwrap_or(-1)),
        }
    }
}

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(e) => write!(f, "unable to create socket: errno {e}"),
            Self::Bind(e) => write!(f, "socket unable to bind: errno {e}"),
            Self::Listen(e) => write!(f, "error occurred during listen: errno {e}"),
            Self::Accept(e) => write!(f, "unable to accept connection: errno {e}"),
            Self::Receive(e) => write!(f, "recv failed: errno {e}"),
            Self::ReceiveTimeout => write!(f, "recv timed out"),
            Self::Send(e) => write!(f, "send failed: errno {e}"),
        }
    }
}

impl std::error::Error for SocketError {}

// ---------------------------------------------------------------------------
// Access-point errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApError {
    /// SSID must be 1-32 printable ASCII bytes.
    InvalidSsid,
    /// WPA2 passphrase must be 8-63 bytes (or empty for an open AP).
    InvalidPassword,
    /// No free slot in the station table / lease pool.
    TableFull,
    /// The radio driver returned an error code.
    Driver(i32),
}

impl fmt::Display for ApError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(
                f,
                "password invalid (must be 8-63 bytes for WPA2, or empty for open)"
            ),
            Self::TableFull => write!(f, "station table full"),
            Self::Driver(code) => write!(f, "radio driver error {code}"),
        }
    }
}

impl std::error::Error for ApError {}
