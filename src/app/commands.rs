//! Inbound commands.
//!
//! A command is whatever bytes a single receive call returned, read as a
//! decimal integer.  `1` turns the indicator on; every other value (and
//! anything that is not a number at all) turns it off.

/// Decoded indicator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    On,
    Off,
}

impl Command {
    /// Decode one receive's worth of bytes.  Never fails.
    pub fn decode(bytes: &[u8]) -> Self {
        if parse_decimal(bytes) == 1 {
            Self::On
        } else {
            Self::Off
        }
    }

    /// Indicator level this command asks for.
    pub const fn level(self) -> bool {
        matches!(self, Self::On)
    }

    /// Acknowledgement written back to the client (no delimiter).
    pub const fn reply(self) -> &'static str {
        match self {
            Self::On => "Led turned on",
            Self::Off => "Led turned off",
        }
    }
}

/// Leading-decimal parse with C `atoi` rules: skip leading whitespace,
/// accept one optional sign, then consume the longest run of ASCII digits.
/// No digits yields 0.  Out-of-range values saturate.
pub fn parse_decimal(bytes: &[u8]) -> i64 {
    let mut rest = bytes;
    while let [b, tail @ ..] = rest {
        if !is_c_space(*b) {
            break;
        }
        rest = tail;
    }

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let magnitude = rest
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative { -magnitude } else { magnitude }
}

/// `isspace` in the C locale.
const fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}
