//! Error types for the storage layer

use esodata_crypto::CryptoError;
use esodata_formats::FormatError;
use thiserror::Error;

/// Data failed an integrity check
///
/// These are never downgraded: a read that fails one of them returns no
/// data at all.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// Plaintext checksum differs from the manifest entry
    #[error("checksum mismatch for {key:#018x}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Global file id
        key: u64,
        /// Checksum stored in the manifest
        expected: u32,
        /// Checksum of the decoded bytes
        actual: u32,
    },

    /// Embedded per-file signature did not verify
    #[error("signature verification failed for {key:#018x}")]
    SignatureMismatch {
        /// Global file id
        key: u64,
    },

    /// Magic, bracket signature or hash table tag did not match
    #[error("{0}")]
    Format(FormatError),

    /// Definition rows carry a different layout version than the record type
    #[error("definition table {def_index} has version {actual}, expected {expected}")]
    VersionMismatch {
        /// Definition table index
        def_index: u32,
        /// Version compiled into the record type
        expected: u32,
        /// Version in the row file header
        actual: u32,
    },

    /// Definition rows were not produced for the client
    #[error("definition table {def_index} is not a client depot (flags {flags:#x})")]
    NotClientDepot {
        /// Definition table index
        def_index: u32,
        /// Flags in the row file header
        flags: u32,
    },
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No archive holds the key.
    #[error("file {0:#018x} not found")]
    NotFound(u64),

    /// Integrity check failed.
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    /// Malformed data.
    #[error("invalid format: {0}")]
    Format(FormatError),

    /// Entry extends past the end of its data file.
    #[error("truncated read: {0}")]
    TruncatedRead(String),

    /// Archive layout error.
    #[error("archive error: {0}")]
    Archive(String),

    /// Object used in an invalid state.
    #[error("invalid state: {0}")]
    State(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Loading was cancelled by the progress callback.
    #[error("loading aborted")]
    Aborted,

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signature primitive failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl StorageError {
    /// Whether the key was simply absent
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the data failed an integrity check
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

impl From<FormatError> for StorageError {
    fn from(error: FormatError) -> Self {
        if error.is_integrity() {
            Self::Integrity(IntegrityError::Format(error))
        } else {
            Self::Format(error)
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
