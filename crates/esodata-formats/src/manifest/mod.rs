//! MES2 manifest (`.mnf`) format
//!
//! A manifest indexes the entries of a set of PES2 data files. Layout, in
//! little-endian order:
//!
//! ```text
//! [magic: u32 = "MES2"][version: u16]
//! [data file count: u8 before 0x0102, u32 from 0x0102]
//! [flags: u32]
//! [body: sized region, big-endian]
//!     [directory signature]      if flags & DIRECTORY_SIGNATURE
//!     [entry table: keyed hash table of u64 -> entry]
//! ```
//!
//! When the directory signature flag is set, the exact bytes of the encoded
//! entry table are kept so the signature can be checked later.

mod entry;
mod file;
mod header;
mod signature;

pub use entry::ManifestEntry;
pub use file::Manifest;
pub use header::{ManifestFlags, ManifestHeader};
pub use signature::FileSignature;

/// `"MES2"` read as a little-endian u32
pub const MANIFEST_MAGIC: u32 = 0x3253_454D;

/// First version that stores the data file count as a u32
pub const WIDE_DATA_FILE_COUNT_VERSION: u16 = 0x0102;
