//! Wire primitives for the Drcom protocol
//!
//! This crate provides the pure, stateless building blocks every Drcom packet
//! is made of:
//!
//! - **MD5 credential digests** keyed with the per-attempt salt
//! - **Rotate-XOR** obfuscation of the extended password block
//! - The proprietary **gateway checksum** of the login extension block
//! - **Integer and address encodings** for the fixed-offset packet layouts
//!
//! # Architecture
//!
//! - [`digest`] - MD5 helpers and the rotate-XOR routine
//! - [`checksum`] - gateway checksum
//! - [`encoding`] - big-endian integer packing, dotted quads, NUL-padded fields
//!
//! # Quick Start
//!
//! ```rust
//! use drcom_packet::{gateway_checksum, login_md5, rotate_xor_password};
//!
//! let salt = [0xAA, 0xBB, 0xCC, 0xDD];
//! let digest = login_md5(&salt, b"password");
//! let ror = rotate_xor_password(&digest, b"password");
//! assert_eq!(ror.len(), 8);
//!
//! let crc = gateway_checksum(&digest);
//! assert_eq!(crc.len(), 4);
//! ```

pub mod checksum;
pub mod digest;
pub mod encoding;

pub use checksum::gateway_checksum;
pub use digest::{login_md5, md5, md5_concat, password_md5, rotate_xor_password};
pub use encoding::{
    bytes_to_dotted_quad, dotted_quad_to_bytes, fixed_field, int_to_fixed_bytes, int_to_min_bytes,
};
