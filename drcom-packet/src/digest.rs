//! Hashing and password obfuscation
//!
//! The protocol uses plain MD5 as a keyed hash, mixing the salt and password
//! directly into the digest input. These helpers reproduce the exact inputs
//! the gateway expects.

use md5::{Digest, Md5};

/// Calculates the MD5 digest of `data`.
pub fn md5(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// MD5 over the concatenation of several slices, without an intermediate buffer.
pub fn md5_concat(parts: &[&[u8]]) -> [u8; 16] {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Credential digest `md5(03 01 || salt || password)`.
///
/// Shared by the login, logout and keepalive phase-1 packets, and the key of
/// the rotate-XOR password block.
pub fn login_md5(salt: &[u8; 4], password: &[u8]) -> [u8; 16] {
    md5_concat(&[&[0x03, 0x01], salt, password])
}

/// Secondary credential digest `md5(01 || password || salt || 00 00 00 00)`.
pub fn password_md5(salt: &[u8; 4], password: &[u8]) -> [u8; 16] {
    md5_concat(&[&[0x01], password, salt, &[0x00; 4]])
}

/// XORs each password byte with the matching digest byte and rotates the
/// result left by 3 bits.
///
/// The output has the same length as `password`. Only the first 16 password
/// bytes can be covered by a digest; longer passwords are truncated.
///
/// # Examples
///
/// ```
/// use drcom_packet::digest::rotate_xor_password;
///
/// // 0x61 rotated left by 3 within a byte is 0x0b
/// assert_eq!(rotate_xor_password(&[0u8; 16], b"a"), vec![0x0b]);
/// ```
pub fn rotate_xor_password(digest: &[u8; 16], password: &[u8]) -> Vec<u8> {
    digest
        .iter()
        .zip(password)
        .map(|(d, p)| (d ^ p).rotate_left(3))
        .collect()
}
