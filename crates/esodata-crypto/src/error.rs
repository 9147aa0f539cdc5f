//! Error types for cryptographic operations

use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Public key could not be imported from its DER encoding
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes are malformed for the key in use
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),
}
