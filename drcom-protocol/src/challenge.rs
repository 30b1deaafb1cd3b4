//! Challenge request and reply
//!
//! The challenge is the first exchange of every login or logout attempt. The
//! gateway answers with a fresh 4-byte salt that keys the credential digests.

use bytes::{BufMut, BytesMut};
use drcom_core::{Error, Result, Salt};

use crate::constants::{CODE_CHALLENGE, CODE_CHALLENGE_REPLY};

/// Length of a challenge request on the wire
pub const CHALLENGE_LEN: usize = 20;

/// Challenge request: `01 02 <u16 LE nonce> 09 <15 x 00>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengePacket {
    pub nonce: u16,
}

impl ChallengePacket {
    pub fn new(nonce: u16) -> Self {
        Self { nonce }
    }

    /// Derive the nonce from the wall clock plus a small random offset
    ///
    /// The gateway does not validate the value. It only has to differ between
    /// consecutive attempts.
    pub fn from_clock(unix_secs: u64, jitter: u64) -> Self {
        let nonce = (unix_secs.wrapping_add(jitter) % 0xffff) as u16;
        Self { nonce }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(CHALLENGE_LEN);

        buffer.put_slice(&CODE_CHALLENGE);
        buffer.put_u16_le(self.nonce);
        buffer.put_u8(0x09);
        buffer.put_bytes(0x00, 15);

        buffer.to_vec()
    }
}

/// Extract the salt from a challenge reply
///
/// The reply must start with `0x02` and carry the salt at bytes 4..8.
pub fn parse_challenge_reply(data: &[u8]) -> Result<Salt> {
    let code = data.first().copied().unwrap_or(0);
    if code != CODE_CHALLENGE_REPLY || data.len() < 8 {
        return Err(Error::ChallengeRejected { code });
    }

    let mut salt = [0u8; 4];
    salt.copy_from_slice(&data[4..8]);
    Ok(Salt(salt))
}
