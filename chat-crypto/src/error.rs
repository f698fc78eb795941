//! Error kinds surfaced by cryptographic operations.

use thiserror::Error;

/// Errors that can occur during key generation, encoding, signing, or
/// verification.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The underlying RSA primitive failed (key generation, signing).
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),

    /// PKCS#8 private-key encoding/decoding failed.
    #[error("PKCS8 error: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    /// SubjectPublicKeyInfo encoding/decoding failed.
    #[error("SPKI error: {0}")]
    Spki(#[from] rsa::pkcs8::spki::Error),
}
