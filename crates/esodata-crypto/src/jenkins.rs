//! Jenkins lookup2 hash used by the on-disk hash tables
//!
//! This is Bob Jenkins' 1996 `lookup2.c` hash with the archive's fixed seed:
//! `a` and `b` start at the golden ratio and `c` starts at `0xA8396`. It
//! supplies the low 32 bits of the 64-bit bucket hash in [`crate::hash`].
//!
//! Input words are read little-endian, matching how the shipping client hashes
//! the in-memory representation of its keys.

/// The golden ratio; an arbitrary value
const GOLDEN_RATIO: u32 = 0x9e37_79b9;

/// Seed that stands in for "the previous hash value" in lookup2
pub const LOOKUP2_SEED: u32 = 0x000a_8396;

/// Compute the lookup2 hash of `data` with the archive seed
///
/// # Examples
///
/// ```
/// use esodata_crypto::jenkins::lookup2;
///
/// assert_eq!(lookup2(b"abc"), 0x142a_e89b);
/// ```
pub fn lookup2(data: &[u8]) -> u32 {
    lookup2_with_seed(data, LOOKUP2_SEED)
}

/// Compute the lookup2 hash of `data` with an explicit initial `c` value
pub fn lookup2_with_seed(data: &[u8], seed: u32) -> u32 {
    let mut a = GOLDEN_RATIO;
    let mut b = GOLDEN_RATIO;
    let mut c = seed;
    let mut k = data;

    while k.len() >= 12 {
        a = a.wrapping_add(u32::from_le_bytes([k[0], k[1], k[2], k[3]]));
        b = b.wrapping_add(u32::from_le_bytes([k[4], k[5], k[6], k[7]]));
        c = c.wrapping_add(u32::from_le_bytes([k[8], k[9], k[10], k[11]]));
        mix(&mut a, &mut b, &mut c);
        k = &k[12..];
    }

    // lookup2 folds the full input length into c, truncated to 32 bits
    c = c.wrapping_add(data.len() as u32);

    // Last 0-11 bytes. The lowest byte of c is reserved for the length, so
    // tail bytes 8..=10 land in c shifted up by one byte.
    for (index, &byte) in k.iter().enumerate() {
        let byte = u32::from(byte);
        match index {
            0..=3 => a = a.wrapping_add(byte << (8 * index)),
            4..=7 => b = b.wrapping_add(byte << (8 * (index - 4))),
            _ => c = c.wrapping_add(byte << (8 * (index - 7))),
        }
    }

    mix(&mut a, &mut b, &mut c);
    c
}

/// Mix 3 u32 values reversibly (lookup2 variant)
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*b).wrapping_sub(*c);
    *a ^= *c >> 13;
    *b = b.wrapping_sub(*c).wrapping_sub(*a);
    *b ^= *a << 8;
    *c = c.wrapping_sub(*a).wrapping_sub(*b);
    *c ^= *b >> 13;

    *a = a.wrapping_sub(*b).wrapping_sub(*c);
    *a ^= *c >> 12;
    *b = b.wrapping_sub(*c).wrapping_sub(*a);
    *b ^= *a << 16;
    *c = c.wrapping_sub(*a).wrapping_sub(*b);
    *c ^= *b >> 5;

    *a = a.wrapping_sub(*b).wrapping_sub(*c);
    *a ^= *c >> 3;
    *b = b.wrapping_sub(*c).wrapping_sub(*a);
    *b ^= *a << 10;
    *c = c.wrapping_sub(*a).wrapping_sub(*b);
    *c ^= *b >> 15;
}
