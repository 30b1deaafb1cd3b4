//! Common types used throughout drcom-rs

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
///
/// The login packet treats the adapter address as a 48-bit integer, so the
/// conversions to and from `u64` are the primary constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00; 6])
    }

    /// Build from the low 48 bits of an integer
    pub fn from_u64(value: u64) -> Self {
        let be = value.to_be_bytes();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&be[2..]);
        Self(bytes)
    }

    /// Interpret the address as a big-endian 48-bit integer
    pub fn to_u64(self) -> u64 {
        let mut be = [0u8; 8];
        be[2..].copy_from_slice(&self.0);
        u64::from_be_bytes(be)
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    /// Accepts `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff` or a bare `0x`-prefixed integer
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let value = u64::from_str_radix(hex, 16)
                .map_err(|_| crate::Error::invalid_address(s, "Invalid MAC address hex"))?;
            if value > 0xFFFF_FFFF_FFFF {
                return Err(crate::Error::invalid_address(s, "MAC address wider than 48 bits"));
            }
            return Ok(Self::from_u64(value));
        }

        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(crate::Error::invalid_address(s, "Invalid MAC address format"));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::invalid_address(s, "Invalid MAC address hex"))?;
        }

        Ok(MacAddr(bytes))
    }
}

/// 4-byte value issued by the gateway in every challenge reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt(pub [u8; 4]);

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// 16-byte token issued by the gateway on a successful login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthInfo(pub [u8; 16]);

impl AuthInfo {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Last 4 bytes echoed by the gateway in a keepalive reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tail(pub [u8; 4]);

impl Tail {
    /// Tail used before any keepalive exchange
    pub const ZERO: Tail = Tail([0; 4]);

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Default gateway UDP port
pub const DRCOM_PORT: u16 = 61440;
