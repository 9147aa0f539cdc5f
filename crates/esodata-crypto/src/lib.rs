//! Cryptographic operations for MES2/PES2 archives
//!
//! This crate provides the primitives the archive read path relies on for
//! bucket hashing, integrity checks and signature verification.
//!
//! # Components
//!
//! - **Hashing**: DJB2 and Jenkins lookup2, combined into the 64-bit bucket hash
//! - **Checksums**: the CRC-32 variant stored in manifest entries
//! - **Signatures**: SHA-1 digest, DER public-key import, RSA verification
//!
//! # Examples
//!
//! ## Bucket hash for a table key
//!
//! ```
//! use esodata_crypto::hash::hash64;
//!
//! let hash = hash64(&1u64.to_le_bytes());
//! assert_eq!(hash, 0x67f5_1ee6_e2d8_6957);
//! ```
//!
//! ## Entry checksum
//!
//! ```
//! use esodata_crypto::entry_checksum;
//!
//! assert_eq!(entry_checksum(b"hello"), 0xf032_519b);
//! ```

#![warn(missing_docs)]

pub mod crc;
pub mod error;
pub mod hash;
pub mod jenkins;
pub mod signature;

pub use error::CryptoError;

// Re-export commonly used types
pub use crc::entry_checksum;
pub use hash::{djb2, hash64};
pub use jenkins::lookup2;
pub use signature::{RsaSha1Verifier, Sha1Digest, SignatureVerifier, sha1_digest};
