//! Entry checksums
//!
//! Manifest entries store a CRC-32 (IEEE polynomial) of the plaintext. The
//! shipping client runs the register from zero and skips the final inversion,
//! i.e. it computes `!crc32_update(0xFFFF_FFFF, data)` with zlib semantics.
//! Stored checksums only match that variant.

use crc32fast::Hasher;

/// Compute the checksum stored in manifest entries for `data`
///
/// # Examples
///
/// ```
/// use esodata_crypto::crc::entry_checksum;
///
/// assert_eq!(entry_checksum(b"hello"), 0xf032_519b);
/// assert_eq!(entry_checksum(b""), 0);
/// ```
pub fn entry_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(0xFFFF_FFFF);
    hasher.update(data);
    !hasher.finalize()
}
