//! File format parsers and builders for MES2/PES2 archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::needless_pass_by_value)] // Builder inputs
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! This crate provides symmetric (parser and builder) implementations for
//! the formats found in a game data depot: MES2 manifests, PES2 data file
//! headers, ZOSFT name tables, definition tables and world tables of
//! contents.
//!
//! # Supported Formats
//!
//! - **Manifest**: header, optional directory signature and entry table
//! - **Data file**: 14-byte PES2 header in front of entry payloads
//! - **Name table**: file names for a range of global file ids
//! - **Definition tables**: index and compressed row files
//! - **World table of contents**: world size and terrain layers
//!
//! # Building Blocks
//!
//! All formats are expressed over the byte-order-aware streams in
//! [`stream`], the nested regions in [`region`] and the type 3 hash table in
//! [`hash_table`].
//!
//! # Example
//!
//! ```
//! use esodata_formats::ArchiveFormat;
//! use esodata_formats::hash_table::KeyedHashTableBuilder;
//! use esodata_formats::manifest::{Manifest, ManifestEntry, ManifestFlags, ManifestHeader};
//!
//! let entries = KeyedHashTableBuilder::new()
//!     .insert(1u64, ManifestEntry::default())
//!     .build()?;
//! let header = ManifestHeader::new(0x0103, 1, ManifestFlags::default())?;
//! let data = Manifest::new(header, entries).build()?;
//!
//! let manifest = Manifest::parse(&data)?;
//! assert!(manifest.find(1).is_some());
//! # Ok::<(), esodata_formats::FormatError>(())
//! ```

#![warn(missing_docs)]

pub mod addressing;
pub mod compression;
pub mod data_file;
pub mod def;
pub mod error;
pub mod hash_table;
pub mod manifest;
pub mod name_table;
pub mod region;
pub mod stream;
pub mod world;

pub use error::{FormatError, FormatResult};

/// Common format trait that all top-level formats implement
pub trait ArchiveFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> FormatResult<Self>;

    /// Build to bytes
    fn build(&self) -> FormatResult<Vec<u8>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> FormatResult<()> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data.len() != rebuilt.len() {
            return Err(FormatError::SizeMismatch {
                expected: data.len(),
                actual: rebuilt.len(),
            });
        }
        match data.iter().zip(&rebuilt).position(|(a, b)| a != b) {
            Some(offset) => Err(FormatError::RoundTripMismatch { offset }),
            None => Ok(()),
        }
    }
}
