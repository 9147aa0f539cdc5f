//! Per-file signature verification
//!
//! Signed archives prefix every plaintext with an embedded DER public key and
//! an RSA signature over the SHA-1 digest of the remaining payload. This module
//! exposes the three primitives the read path needs (digest, key import,
//! verify) and a [`SignatureVerifier`] seam so callers can substitute their own
//! implementation.

use crate::error::CryptoError;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::{Digest, Sha1};

/// SHA-1 digest bytes
pub type Sha1Digest = [u8; 20];

/// Imported public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Access the underlying RSA key
    pub fn as_rsa(&self) -> &RsaPublicKey {
        &self.0
    }
}

/// Compute the SHA-1 digest of `data`
pub fn sha1_digest(data: &[u8]) -> Sha1Digest {
    let mut digest = [0u8; 20];
    digest.copy_from_slice(&Sha1::digest(data));
    digest
}

/// Import a DER-encoded public key
///
/// Accepts an X.509 `SubjectPublicKeyInfo` structure, falling back to a bare
/// PKCS#1 `RSAPublicKey`.
pub fn import_public_key(der: &[u8]) -> Result<PublicKey, CryptoError> {
    if let Ok(key) = RsaPublicKey::from_public_key_der(der) {
        return Ok(PublicKey(key));
    }

    RsaPublicKey::from_pkcs1_der(der)
        .map(PublicKey)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Verify a PKCS#1 v1.5 signature over a precomputed SHA-1 digest
pub fn verify(key: &PublicKey, digest: &Sha1Digest, signature: &[u8]) -> bool {
    key.0
        .verify(Pkcs1v15Sign::new::<Sha1>(), digest, signature)
        .is_ok()
}

/// Signature check used by signed archives
pub trait SignatureVerifier: Send + Sync {
    /// Check `signature` over `digest` with the DER-encoded `public_key`
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not match.
    fn verify_digest(
        &self,
        public_key: &[u8],
        digest: &Sha1Digest,
        signature: &[u8],
    ) -> Result<bool, CryptoError>;

    /// Digest `payload` and check `signature` over it
    fn verify_payload(
        &self,
        public_key: &[u8],
        payload: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        self.verify_digest(public_key, &sha1_digest(payload), signature)
    }
}

/// RSA PKCS#1 v1.5 / SHA-1 verifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaSha1Verifier;

impl SignatureVerifier for RsaSha1Verifier {
    fn verify_digest(
        &self,
        public_key: &[u8],
        digest: &Sha1Digest,
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        let key = import_public_key(public_key)?;
        Ok(verify(&key, digest, signature))
    }
}
