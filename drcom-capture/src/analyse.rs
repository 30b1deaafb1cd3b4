//! Derive gateway constants from a packet capture
//!
//! The capture file (pcap or pcapng) is scanned as raw bytes for the UDP
//! header of a login sent to port 61440, `f0 00 f0 00 <len> <csum> (03|07) 01`.
//! The login payload starts 8 bytes after the match and the fixed login
//! offsets give the constants. The IPv4 destination sits right before the UDP
//! header.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use drcom_core::{Error, GatewayProfile, Result};
use tracing::{debug, info};

/// One position of a byte pattern
#[derive(Debug, Clone, Copy)]
enum Pat {
    Byte(u8),
    Any,
    OneOf(&'static [u8]),
}

impl Pat {
    fn matches(self, b: u8) -> bool {
        match self {
            Pat::Byte(x) => x == b,
            Pat::Any => true,
            Pat::OneOf(set) => set.contains(&b),
        }
    }
}

use Pat::{Any, Byte, OneOf};

/// UDP 61440 -> 61440 header followed by a login header
const LOGIN_PATTERN: [Pat; 10] = [
    Byte(0xf0),
    Byte(0x00),
    Byte(0xf0),
    Byte(0x00),
    Any,
    Any,
    Any,
    Any,
    OneOf(&[0x03, 0x07]),
    Byte(0x01),
];

/// UDP header followed by a type-1 keepalive up to its version bytes
const KEEPALIVE_PATTERN: [Pat; 14] = [
    Byte(0xf0),
    Byte(0x00),
    Byte(0xf0),
    Byte(0x00),
    Any,
    Any,
    Any,
    Any,
    Byte(0x07),
    Any,
    Byte(0x28),
    Byte(0x00),
    Byte(0x0b),
    Byte(0x01),
];

/// Bytes between the UDP header and the login payload
const UDP_HEADER_LEN: usize = 8;

/// Shortest login payload carrying every analysed field
const MIN_LOGIN_PAYLOAD: usize = 312;

fn find_all<'a>(data: &'a [u8], pattern: &'a [Pat]) -> impl Iterator<Item = usize> + 'a {
    data.windows(pattern.len())
        .enumerate()
        .filter(move |(_, window)| window.iter().zip(pattern).all(|(b, p)| p.matches(*b)))
        .map(|(i, _)| i)
}

/// Constants recovered from a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureAnalysis {
    pub server: Ipv4Addr,
    pub control_check_status: u8,
    pub adapter_num: u8,
    pub ip_dog: u8,
    pub auth_version: [u8; 2],
    /// `None` when the capture has no steady-state keepalive
    pub keep_alive_version: Option<[u8; 2]>,
    pub ror_version: bool,
}

impl CaptureAnalysis {
    /// Gateway profile, falling back to the default keepalive version
    pub fn profile(&self) -> GatewayProfile {
        let defaults = GatewayProfile::default();
        GatewayProfile {
            control_check_status: self.control_check_status,
            adapter_num: self.adapter_num,
            ip_dog: self.ip_dog,
            auth_version: self.auth_version,
            keep_alive_version: self.keep_alive_version.unwrap_or(defaults.keep_alive_version),
            ror_version: self.ror_version,
        }
    }
}

/// Analyse a capture file on disk
pub fn analyse_file(path: &Path) -> Result<CaptureAnalysis> {
    let data = fs::read(path)?;
    info!(path = %path.display(), bytes = data.len(), "Analysing capture");
    analyse_bytes(&data)
}

/// Analyse raw capture bytes
pub fn analyse_bytes(data: &[u8]) -> Result<CaptureAnalysis> {
    let offset = find_all(data, &LOGIN_PATTERN)
        .map(|i| i + UDP_HEADER_LEN)
        .find(|&offset| offset >= 12 && offset + MIN_LOGIN_PAYLOAD <= data.len())
        .ok_or_else(|| Error::Capture("no login packet to port 61440 found".to_string()))?;
    debug!(offset, "Found login payload");

    let login = &data[offset..];
    let ror_version = matches!(login.get(334..338), Some([0x00, 0x00, _, _]));

    let keep_alive_version = find_all(data, &KEEPALIVE_PATTERN)
        .filter_map(|i| data.get(i + KEEPALIVE_PATTERN.len()..i + KEEPALIVE_PATTERN.len() + 2))
        .find(|version| *version != [0x0f, 0x27])
        .map(|version| [version[0], version[1]]);

    let server = Ipv4Addr::new(
        data[offset - 12],
        data[offset - 11],
        data[offset - 10],
        data[offset - 9],
    );

    Ok(CaptureAnalysis {
        server,
        control_check_status: login[56],
        adapter_num: login[57],
        ip_dog: login[105],
        auth_version: [login[310], login[311]],
        keep_alive_version,
        ror_version,
    })
}
