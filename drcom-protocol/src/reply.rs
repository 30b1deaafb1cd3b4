//! Read-only view over a received keepalive datagram

use drcom_core::{Error, Result, Tail};

use crate::constants::{CODE_KEEPALIVE, KEEPALIVE_FILE_MARKER};

/// A datagram received from the gateway
#[derive(Debug, Clone, Copy)]
pub struct Reply<'a> {
    data: &'a [u8],
}

impl<'a> Reply<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Leading discriminant byte, `0` for an empty datagram
    pub fn code(&self) -> u8 {
        self.data.first().copied().unwrap_or(0)
    }

    pub fn is_keepalive(&self) -> bool {
        self.code() == CODE_KEEPALIVE
    }

    /// Bytes 16..20, or zeros when the reply is too short
    pub fn tail(&self) -> Tail {
        match self.data.get(16..20) {
            Some(bytes) => {
                let mut tail = [0u8; 4];
                tail.copy_from_slice(bytes);
                Tail(tail)
            }
            None => Tail::ZERO,
        }
    }

    /// Gateway pushed a file or notice instead of a regular keepalive reply
    pub fn is_file_push(&self) -> bool {
        self.is_keepalive() && self.data.get(2) == Some(&KEEPALIVE_FILE_MARKER)
    }

    /// Acceptance rule for the reply to the first type-1 keepalive
    ///
    /// Accepts `07 00 28 00`, `07 <seq> 28 00`, or a file push.
    pub fn accepts_first_keepalive(&self, sequence: u8) -> bool {
        self.data.starts_with(&[CODE_KEEPALIVE, 0x00, 0x28, 0x00])
            || self.data.starts_with(&[CODE_KEEPALIVE, sequence, 0x28, 0x00])
            || self.is_file_push()
    }

    /// Fail with `KeepAliveRejected` unless the reply starts with `0x07`
    pub fn expect_keepalive(&self, phase: &'static str) -> Result<()> {
        if self.is_keepalive() {
            Ok(())
        } else {
            Err(Error::keepalive_rejected(phase, self.code()))
        }
    }
}
