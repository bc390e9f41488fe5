//! System configuration parameters
//!
//! All tunable parameters for the LedLink device.  There is no persistent
//! or runtime configuration: the firmware boots with
//! [`SystemConfig::default()`], which holds the compile-time constants.

use core::fmt;
use core::net::{Ipv4Addr, SocketAddrV4};
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pins;

/// Receive buffer size.  A single receive reads at most
/// `RX_BUFFER_LEN - 1` bytes, and each receive is decoded independently.
pub const RX_BUFFER_LEN: usize = 128;

/// Well-known command port.
pub const COMMAND_PORT: u16 = 3000;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub access_point: AccessPointConfig,
    pub server: ServerConfig,
    pub indicator: IndicatorConfig,
}

/// Soft-AP identity and addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPointConfig {
    pub ssid: heapless::String<32>,
    /// WPA2-PSK passphrase; empty means an open network.
    pub password: heapless::String<64>,
    /// Radio channel (1-13).
    pub channel: u8,
    /// Maximum number of associated stations.
    pub max_connections: u8,
    pub ssid_hidden: bool,
    /// Beacon interval in time units (~1.024 ms each).
    pub beacon_interval: u16,
    /// The device's own fixed address; also the gateway handed to stations.
    pub address: [u8; 4],
    pub prefix_len: u8,
    /// Host part of the first address leased to stations.
    pub lease_start: u8,
}

/// Command socket parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Pending-connection queue length.  One: a single client at a time.
    pub backlog: u8,
    /// Bound on a stalled client's receive; `None` blocks forever.
    pub recv_timeout_ms: Option<u32>,
    pub restart_policy: RestartPolicy,
}

/// What the command service does when the listening socket cannot be
/// built or `accept` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// End the service task on the first failure.
    Terminate,
    /// Rebuild the socket after an exponential backoff
    /// (`initial_backoff_ms` doubling up to `max_backoff_ms`).
    /// `max_attempts` bounds consecutive failures; `None` retries forever.
    Retry {
        initial_backoff_ms: u32,
        max_backoff_ms: u32,
        max_attempts: Option<u32>,
    },
}

/// Status indicator output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub gpio: i32,
    /// Run the periodic blink task alongside the command service.
    pub blink_enabled: bool,
    /// Time spent in each of the on/off phases.
    pub blink_half_period_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            access_point: AccessPointConfig::default(),
            server: ServerConfig::default(),
            indicator: IndicatorConfig::default(),
        }
    }
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        let mut ssid = heapless::String::new();
        let _ = ssid.push_str("ESP_32");
        let mut password = heapless::String::new();
        let _ = password.push_str("12345678");
        Self {
            ssid,
            password,
            channel: 1,
            max_connections: 4,
            ssid_hidden: false,
            beacon_interval: 100,
            address: [192, 168, 1, 1],
            prefix_len: 24,
            lease_start: 2,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: COMMAND_PORT,
            backlog: 1,
            recv_timeout_ms: None,
            restart_policy: RestartPolicy::Retry {
                initial_backoff_ms: 1_000,
                max_backoff_ms: 30_000,
                max_attempts: None,
            },
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            gpio: pins::INDICATOR_GPIO,
            blink_enabled: true,
            blink_half_period_ms: 1_000,
        }
    }
}

impl AccessPointConfig {
    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Address of the `index`-th lease (0-based) in the station pool.
    pub fn lease_addr(&self, index: usize) -> Option<Ipv4Addr> {
        let host = usize::from(self.lease_start).checked_add(index)?;
        let host = u8::try_from(host).ok().filter(|h| *h < 255)?;
        let [a, b, c, _] = self.address;
        Some(Ipv4Addr::new(a, b, c, host))
    }
}

impl ServerConfig {
    /// Wildcard address the listening socket binds to.
    pub fn bind_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.port)
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
    }
}

impl IndicatorConfig {
    pub fn blink_half_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.blink_half_period_ms))
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSsid,
    InvalidPassword,
    InvalidChannel,
    InvalidPrefix,
    ZeroBacklog,
    InvalidBackoff,
    ZeroBlinkPeriod,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID must be 1-32 printable ASCII bytes"),
            Self::InvalidPassword => write!(f, "password must be 8-63 bytes, or empty for open"),
            Self::InvalidChannel => write!(f, "channel must be 1-13"),
            Self::InvalidPrefix => write!(f, "prefix length must be 8-30"),
            Self::ZeroBacklog => write!(f, "listen backlog must be at least 1"),
            Self::InvalidBackoff => write!(f, "backoff must be non-zero and initial <= max"),
            Self::ZeroBlinkPeriod => write!(f, "blink half-period must be non-zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConfigError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConfigError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ConfigError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 63 {
        return Err(ConfigError::InvalidPassword);
    }
    Ok(())
}

impl SystemConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ap = &self.access_point;
        validate_ssid(&ap.ssid)?;
        validate_password(&ap.password)?;
        if !(1..=13).contains(&ap.channel) {
            return Err(ConfigError::InvalidChannel);
        }
        if !(8..=30).contains(&ap.prefix_len) {
            return Err(ConfigError::InvalidPrefix);
        }
        if self.server.backlog == 0 {
            return Err(ConfigError::ZeroBacklog);
        }
        if let RestartPolicy::Retry {
            initial_backoff_ms,
            max_backoff_ms,
            ..
        } = self.server.restart_policy
        {
            if initial_backoff_ms == 0 || initial_backoff_ms > max_backoff_ms {
                return Err(ConfigError::InvalidBackoff);
            }
        }
        if self.indicator.blink_enabled && self.indicator.blink_half_period_ms == 0 {
            return Err(ConfigError::ZeroBlinkPeriod);
        }
        Ok(())
    }
}
