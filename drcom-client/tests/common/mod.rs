//! Shared fixtures for the state machine scenarios

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use async_trait::async_trait;
use drcom_client::{Cancellation, RecvOutcome, Transport};
use drcom_core::{Error, GatewayProfile, MacAddr, Result, Session};

pub const SALT: [u8; 4] = [0xAA, 0xBB, 0xCC, 0xDD];

pub fn session(server: SocketAddr) -> Session {
    Session::new(
        server,
        "student",
        "secret",
        MacAddr::from_u64(0x0011_2233_4455),
        Ipv4Addr::new(10, 0, 0, 2),
        Ipv4Addr::new(10, 0, 0, 1),
        Ipv4Addr::new(10, 0, 0, 1),
        "host",
        "linux",
        GatewayProfile::default(),
    )
}

pub fn gateway_addr() -> SocketAddr {
    "10.0.0.1:61440".parse().unwrap()
}

/// `02 ?? ?? ?? <salt> <pad>`
pub fn challenge_reply(salt: [u8; 4]) -> Vec<u8> {
    let mut reply = vec![0x02, 0x01, 0x00, 0x00];
    reply.extend_from_slice(&salt);
    reply.extend_from_slice(&[0u8; 68]);
    reply
}

/// `04 <22 bytes> <auth_info> <pad>`
pub fn login_success(auth_info: [u8; 16]) -> Vec<u8> {
    let mut reply = vec![0x04];
    reply.extend_from_slice(&[0u8; 22]);
    reply.extend_from_slice(&auth_info);
    reply.extend_from_slice(&[0u8; 8]);
    reply
}

/// Keepalive reply echoing `seq`, with `tail` at bytes 16..20
pub fn keepalive_reply(seq: u8, tail: [u8; 4]) -> Vec<u8> {
    let mut reply = vec![0x07, seq, 0x28, 0x00];
    reply.extend_from_slice(&[0u8; 12]);
    reply.extend_from_slice(&tail);
    reply.extend_from_slice(&[0u8; 20]);
    reply
}

/// In-memory transport replaying a fixed list of receive outcomes
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<RecvOutcome>,
    pub sent: Vec<Vec<u8>>,
    pub drained: usize,
    stop: Option<Cancellation>,
}

impl ScriptedTransport {
    pub fn new<I: IntoIterator<Item = RecvOutcome>>(replies: I) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn replies(replies: Vec<Vec<u8>>) -> Self {
        Self::new(replies.into_iter().map(RecvOutcome::Reply))
    }

    /// Once the script runs out, cancel and answer every receive with a timeout
    pub fn cancel_when_exhausted(mut self, cancel: Cancellation) -> Self {
        self.stop = Some(cancel);
        self
    }

    /// Number of sent packets starting with `kind`
    pub fn count_kind(&self, kind: [u8; 2]) -> usize {
        self.sent_kinds().iter().filter(|k| **k == kind).count()
    }

    /// Leading two bytes of every packet sent so far
    pub fn sent_kinds(&self) -> Vec<[u8; 2]> {
        self.sent.iter().map(|p| [p[0], p[1]]).collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.sent.push(data.to_vec());
        Ok(())
    }

    async fn recv(&mut self) -> Result<RecvOutcome> {
        if let Some(outcome) = self.replies.pop_front() {
            return Ok(outcome);
        }
        match &self.stop {
            Some(cancel) => {
                cancel.cancel();
                Ok(RecvOutcome::Timeout)
            }
            None => Err(Error::Io(io::Error::new(io::ErrorKind::Other, "script exhausted"))),
        }
    }

    async fn drain(&mut self) -> Result<usize> {
        self.drained += 1;
        Ok(0)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok("127.0.0.1:60000".parse().unwrap())
    }
}
