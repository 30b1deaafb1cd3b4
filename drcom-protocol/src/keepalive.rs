//! Keepalive packets
//!
//! Phase 1 re-proves the credentials with the auth token from the login
//! reply. Phases 2 and 3 ("type 1" and "type 3") carry the sequence number and
//! the tail echoed by the previous reply.

use std::net::Ipv4Addr;

use bytes::{BufMut, BytesMut};
use drcom_core::{AuthInfo, Salt, Tail};
use drcom_packet::login_md5;

use crate::constants::{CODE_KEEPALIVE, CODE_KEEPALIVE_AUTH, KEEPALIVE_FIRST_VERSION};

/// Length of a phase-1 keepalive
pub const KEEPALIVE1_LEN: usize = 42;

/// Length of a phase-2/3 keepalive
pub const KEEPALIVE2_LEN: usize = 40;

/// Phase-1 keepalive:
/// `ff ‖ md5(03 01 ‖ salt ‖ password) ‖ 00 00 00 ‖ auth_info ‖ <u16 BE time> ‖ 00 00 00 00`
#[derive(Debug, Clone)]
pub struct KeepAlive1Packet {
    digest: [u8; 16],
    auth_info: AuthInfo,
    timestamp: u16,
}

impl KeepAlive1Packet {
    pub fn new(salt: Salt, password: &str, auth_info: AuthInfo, unix_secs: u64) -> Self {
        Self {
            digest: login_md5(&salt.0, password.as_bytes()),
            auth_info,
            timestamp: (unix_secs % 0x1_0000) as u16,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(KEEPALIVE1_LEN);

        buffer.put_u8(CODE_KEEPALIVE_AUTH);
        buffer.put_slice(&self.digest);
        buffer.put_bytes(0x00, 3);
        buffer.put_slice(self.auth_info.as_bytes());
        buffer.put_u16(self.timestamp);
        buffer.put_bytes(0x00, 4);

        buffer.to_vec()
    }
}

/// Phase-2/3 packet variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveType {
    /// Type 1, sent first in every pair
    Type1,
    /// Type 3, carries the host IP
    Type3,
}

impl KeepAliveType {
    pub fn to_u8(self) -> u8 {
        match self {
            KeepAliveType::Type1 => 0x01,
            KeepAliveType::Type3 => 0x03,
        }
    }
}

/// Phase-2/3 keepalive
#[derive(Debug, Clone)]
pub struct KeepAlive2Packet {
    pub sequence: u8,
    pub kind: KeepAliveType,
    /// First type-1 packet of a session, sent with fixed version bytes
    pub first: bool,
    pub keep_alive_version: [u8; 2],
    pub tail: Tail,
    pub host_ip: Ipv4Addr,
}

impl KeepAlive2Packet {
    pub fn new(
        sequence: u8,
        kind: KeepAliveType,
        keep_alive_version: [u8; 2],
        tail: Tail,
        host_ip: Ipv4Addr,
    ) -> Self {
        Self {
            sequence,
            kind,
            first: false,
            keep_alive_version,
            tail,
            host_ip,
        }
    }

    /// Mark as the first type-1 packet of the session
    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(KEEPALIVE2_LEN);

        buffer.put_u8(CODE_KEEPALIVE);
        buffer.put_u8(self.sequence);
        buffer.put_slice(&[0x28, 0x00, 0x0b]);
        buffer.put_u8(self.kind.to_u8());

        if self.first {
            buffer.put_slice(&KEEPALIVE_FIRST_VERSION);
        } else {
            buffer.put_slice(&self.keep_alive_version);
        }

        buffer.put_slice(&[0x2f, 0x12]);
        buffer.put_bytes(0x00, 6);
        buffer.put_slice(self.tail.as_bytes());
        buffer.put_bytes(0x00, 4);

        match self.kind {
            KeepAliveType::Type3 => {
                // Checksum slot, left zero
                buffer.put_bytes(0x00, 4);
                buffer.put_slice(&self.host_ip.octets());
                buffer.put_bytes(0x00, 8);
            }
            KeepAliveType::Type1 => buffer.put_bytes(0x00, 16),
        }

        buffer.to_vec()
    }
}
