//! Bucket hashes for the on-disk keyed hash tables
//!
//! The table bucket for a key is chosen from a 64-bit value whose high half is
//! a DJB2 rolling hash and whose low half is [`lookup2`](crate::jenkins::lookup2),
//! both computed over the key's raw fixed-size byte representation.

use crate::jenkins::lookup2;

/// DJB2 initial value
const DJB2_SEED: u32 = 0x1505;

/// DJB2-style rolling hash: `h = byte + 33 * h` over every input byte
///
/// # Examples
///
/// ```
/// use esodata_crypto::hash::djb2;
///
/// assert_eq!(djb2(b""), 0x1505);
/// assert_eq!(djb2(b"a"), 0x0002_b606);
/// ```
pub fn djb2(data: &[u8]) -> u32 {
    data.iter().fold(DJB2_SEED, |hash, &byte| {
        u32::from(byte).wrapping_add(hash.wrapping_mul(33))
    })
}

/// Combined 64-bit bucket hash: `djb2 << 32 | lookup2`
pub fn hash64(data: &[u8]) -> u64 {
    (u64::from(djb2(data)) << 32) | u64::from(lookup2(data))
}
