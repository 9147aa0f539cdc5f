//! Keyed hash table (encoding type 3)
//!
//! Manifests and name tables store their lookups as open-addressed hash
//! tables. The on-disk form is a small header followed by up to three
//! compressed arrays:
//!
//! ```text
//! [type: u16 = 3][sections: u32 = 4]
//! [bucket count: u32][key count: u32][value count: u32]
//! [buckets: compressed u32 array]   if bucket count != 0
//! [keys:    compressed K array]     if pair count != 0
//! [values:  compressed V array]     if pair count != 0
//! ```
//!
//! Header fields follow the enclosing stream's byte order; the compressed
//! arrays are always little-endian. Each bucket holds a tag whose top two
//! bits give its state and whose low 30 bits index the key and value arrays.
//!
//! Lookup starts at `hash64(key) % bucket_count` and probes linearly,
//! wrapping at the end, for at most `bucket_count` steps. An empty bucket
//! ends the probe.

mod builder;
mod table;

pub use builder::KeyedHashTableBuilder;
pub use table::{BucketState, Iter, KeyedHashTable, TableKey};

/// Encoding tag for the only supported table type
pub const HASH_TABLE_TYPE: u16 = 3;

/// Section count that accompanies [`HASH_TABLE_TYPE`]
pub const HASH_TABLE_SECTIONS: u32 = 4;

/// Bits of a bucket tag that hold the pair index
pub const PAIR_INDEX_MASK: u32 = 0x3FFF_FFFF;

/// Tag state bits for an occupied bucket
pub const OCCUPIED_TAG: u32 = 0x8000_0000;

const STATE_MASK: u32 = 0xC000_0000;
