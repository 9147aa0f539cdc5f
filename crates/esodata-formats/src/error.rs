//! Error types for format parsing and building

use thiserror::Error;

/// Errors raised while decoding or encoding archive formats
#[derive(Debug, Error)]
pub enum FormatError {
    /// A read ran past the end of the bounded region
    #[error("unexpected end of data: needed {needed} bytes at offset {offset}, {available} available")]
    UnexpectedEof {
        /// Offset of the failed read
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Bytes left in the region
        available: usize,
    },

    /// A stream was repositioned outside the data it has seen
    #[error("invalid stream position {position} (limit {limit})")]
    InvalidPosition {
        /// Requested position
        position: usize,
        /// Highest valid position
        limit: usize,
    },

    /// Magic bytes or bracket signature did not match
    #[error("invalid {format} magic: expected {expected:02X?}, got {actual:02X?}")]
    InvalidMagic {
        /// Format being decoded
        format: &'static str,
        /// Expected bytes
        expected: Vec<u8>,
        /// Bytes found
        actual: Vec<u8>,
    },

    /// Hash table encoding tag other than type 3
    #[error("unsupported hash table type: {0}")]
    UnsupportedHashTableType(u16),

    /// Hash table section count other than 4
    #[error("unexpected hash table section count: {0}")]
    UnexpectedSectionCount(u32),

    /// An occupied bucket references a pair that does not exist
    #[error("hash table bucket {bucket} references pair {pair} of {pair_count}")]
    InvalidPairIndex {
        /// Bucket position
        bucket: usize,
        /// Pair index stored in the bucket tag
        pair: usize,
        /// Number of decoded pairs
        pair_count: usize,
    },

    /// Key and value arrays have different lengths
    #[error("hash table has {keys} keys but {values} values")]
    MismatchedPairArrays {
        /// Key count
        keys: usize,
        /// Value count
        values: usize,
    },

    /// Pairs do not fit into the requested bucket array
    #[error("hash table with {buckets} buckets cannot hold {pairs} pairs")]
    TableFull {
        /// Pair count
        pairs: usize,
        /// Bucket count
        buckets: usize,
    },

    /// Inflating or decoding compressed data failed
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Compressing data failed
    #[error("compression failed: {0}")]
    Compression(String),

    /// Decoded size differs from the declared size
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Declared size
        expected: usize,
        /// Observed size
        actual: usize,
    },

    /// Rebuilt bytes differ from the parsed bytes at `offset`
    #[error("round trip differs at byte {offset}")]
    RoundTripMismatch {
        /// First differing byte
        offset: usize,
    },

    /// A compressed stream ended before all input was consumed
    #[error("compressed stream left {0} bytes unconsumed")]
    TrailingCompressedData(usize),

    /// Declared size exceeds the decompression limit
    #[error("declared size {0} exceeds the decompression limit")]
    SizeLimitExceeded(usize),

    /// Compression codec id is not known
    #[error("unsupported compression codec: {0}")]
    UnsupportedCompression(u8),

    /// Format version is not supported
    #[error("unsupported {format} version: {version}")]
    UnsupportedVersion {
        /// Format being decoded
        format: &'static str,
        /// Version found
        version: u32,
    },

    /// A length or count does not fit its on-disk field
    #[error("{field} value {value} does not fit its on-disk field")]
    LengthOverflow {
        /// Field being written
        field: &'static str,
        /// Value that overflowed
        value: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl FormatError {
    /// Whether this error indicates corrupt or foreign data rather than a
    /// malformed length or codec problem
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. } | Self::UnsupportedHashTableType(_)
        )
    }
}

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;
