//! Packet codec for the Drcom authentication protocol
//!
//! This crate builds every datagram the client sends and inspects every
//! datagram it receives. All layouts are fixed-offset binary structures that
//! must match the gateway byte for byte.
//!
//! ## Packets
//!
//! ### Challenge
//! 20-byte request carrying a 16-bit nonce. The reply issues the salt for the
//! next login or logout. See [`challenge`].
//!
//! ### Login / Logout
//! 330-byte login (plus the optional ROR password block) and 80-byte logout,
//! both keyed with MD5 digests of the salt and password. See [`login`].
//!
//! ### Keepalive
//! 42-byte phase-1 packet carrying the auth token, and 40-byte phase-2/3
//! packets carrying the sequence number and the echoed tail. See [`keepalive`].
//!
//! ## Example Usage
//!
//! ```rust
//! use drcom_protocol::{parse_challenge_reply, ChallengePacket};
//!
//! let request = ChallengePacket::new(0x1234).build();
//! assert_eq!(request.len(), 20);
//!
//! let reply = [0x02, 0, 0, 0, 0xAA, 0xBB, 0xCC, 0xDD];
//! let salt = parse_challenge_reply(&reply).unwrap();
//! assert_eq!(salt.0, [0xAA, 0xBB, 0xCC, 0xDD]);
//! ```

pub mod challenge;
pub mod constants;
pub mod keepalive;
pub mod login;
pub mod reply;

mod tests;

pub use challenge::{parse_challenge_reply, ChallengePacket, CHALLENGE_LEN};
pub use keepalive::{KeepAlive1Packet, KeepAlive2Packet, KeepAliveType, KEEPALIVE1_LEN, KEEPALIVE2_LEN};
pub use login::{
    logout_acknowledged, parse_login_reply, LoginPacket, LogoutPacket, LOGIN_LEN, LOGOUT_LEN,
    ROR_MAX_PASSWORD_LEN,
};
pub use reply::Reply;
