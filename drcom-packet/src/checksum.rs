//! Checksum calculations for Drcom packets
//!
//! The login packet carries a proprietary 32-bit checksum in its extension
//! block. It is not a CRC: it is an XOR fold of little-endian words seeded with
//! 1234 and scaled by 1968.

/// Seed of the XOR accumulator
const CHECKSUM_SEED: u32 = 1234;

/// Multiplier applied after folding
const CHECKSUM_FACTOR: u32 = 1968;

/// Calculates the Drcom gateway checksum.
///
/// The input is split into 4-byte chunks, the last one zero-padded on the
/// right. Each chunk is read as a little-endian `u32` and XORed into an
/// accumulator that starts at 1234. The accumulator is then multiplied by 1968
/// modulo 2^32 and emitted little-endian.
///
/// # Arguments
///
/// * `data` - The bytes covered by the checksum
///
/// # Returns
///
/// The 4 checksum bytes, ready to be copied into the packet
///
/// # Examples
///
/// ```
/// use drcom_packet::checksum::gateway_checksum;
///
/// assert_eq!(gateway_checksum(&[0x01, 0x02, 0x03, 0x04]), [0x10, 0x76, 0x44, 0xd7]);
/// ```
pub fn gateway_checksum(data: &[u8]) -> [u8; 4] {
    let mut acc = CHECKSUM_SEED;

    let mut chunks = data.chunks_exact(4);
    for chunk in &mut chunks {
        acc ^= u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let mut word = [0u8; 4];
        word[..remainder.len()].copy_from_slice(remainder);
        acc ^= u32::from_le_bytes(word);
    }

    acc.wrapping_mul(CHECKSUM_FACTOR).to_le_bytes()
}
