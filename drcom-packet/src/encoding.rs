//! Integer, address and fixed-width field encodings

use std::net::Ipv4Addr;

use drcom_core::{Error, Result};

/// Encodes `n` as the shortest big-endian byte string without a leading zero
/// byte.
///
/// The value is formatted as hex, padded on the left with one zero nibble when
/// the digit count is odd, and decoded. Zero encodes as a single `00` byte.
///
/// # Examples
///
/// ```
/// use drcom_packet::encoding::int_to_min_bytes;
///
/// assert_eq!(int_to_min_bytes(0x1), vec![0x01]);
/// assert_eq!(int_to_min_bytes(0x123), vec![0x01, 0x23]);
/// assert_eq!(int_to_min_bytes(0xffff_ffff), vec![0xff, 0xff, 0xff, 0xff]);
/// ```
pub fn int_to_min_bytes(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

/// Encodes the low `N` bytes of `n` big-endian, zero-padded on the left.
///
/// Fixed-width wire fields use this instead of slicing [`int_to_min_bytes`],
/// which would under-fill the field for small values.
pub fn int_to_fixed_bytes<const N: usize>(n: u64) -> [u8; N] {
    let bytes = n.to_be_bytes();
    let mut out = [0u8; N];
    let take = N.min(bytes.len());
    out[N - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    out
}

/// Parses a dotted-quad string into its 4 network-order bytes.
pub fn dotted_quad_to_bytes(s: &str) -> Result<[u8; 4]> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map(|ip| ip.octets())
        .map_err(|_| Error::invalid_address(s, "not a dotted-quad IPv4 address"))
}

/// Formats 4 network-order bytes as a dotted-quad string.
pub fn bytes_to_dotted_quad(bytes: [u8; 4]) -> String {
    Ipv4Addr::from(bytes).to_string()
}

/// Copies `value` into a NUL-padded field of exactly `width` bytes, truncating
/// anything longer.
pub fn fixed_field(value: &[u8], width: usize) -> Vec<u8> {
    let mut field = vec![0u8; width];
    let len = value.len().min(width);
    field[..len].copy_from_slice(&value[..len]);
    field
}
