//! RSA signature creation and verification, SHA256withRSA.
//!
//! Signing and verifying both take a [`SignatureUpdater`] rather than a
//! plain byte slice so callers can assemble a preimage incrementally
//! (field by field) without materializing it as an intermediate `Vec` at
//! every call site; the canonical chat-message preimage in `chat-core` is
//! built exactly this way.

use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer as RsaSigner, Verifier as RsaVerifier};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::CryptoError;

/// Something that can write the bytes to be signed/verified into an
/// [`SignatureOutput`] sink.
pub trait SignatureUpdater {
    /// Writes the preimage bytes into `output`.
    fn update(&self, output: &mut dyn SignatureOutput) -> Result<(), CryptoError>;
}

/// Sink that receives preimage bytes from a [`SignatureUpdater`].
pub trait SignatureOutput {
    /// Appends `data` to the preimage being assembled.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
}

impl SignatureUpdater for &[u8] {
    fn update(&self, output: &mut dyn SignatureOutput) -> Result<(), CryptoError> {
        output.update(self)
    }
}

/// Signs data with an RSA private key using SHA256withRSA.
pub trait Signer {
    /// Signs the bytes produced by `updater`, returning the signature.
    fn sign(&self, updater: &dyn SignatureUpdater) -> Result<Vec<u8>, CryptoError>;
}

/// Verifies RSA signatures using SHA256withRSA.
pub trait SignatureValidator {
    /// Returns `Ok(true)` iff `signature` is valid for the bytes produced by
    /// `updater`. `Ok(false)` (not an error) means the signature simply did
    /// not match.
    fn validate(
        &self,
        updater: &dyn SignatureUpdater,
        signature: &[u8],
    ) -> Result<bool, CryptoError>;
}

/// Signs with a private key, SHA256withRSA / PKCS#1 v1.5.
pub struct RsaPrivateKeySigner {
    signing_key: SigningKey<Sha256>,
}

impl RsaPrivateKeySigner {
    /// Wraps a private key for signing.
    #[must_use]
    pub fn new(private_key: RsaPrivateKey) -> Self {
        Self {
            signing_key: SigningKey::new(private_key),
        }
    }
}

impl Signer for RsaPrivateKeySigner {
    fn sign(&self, updater: &dyn SignatureUpdater) -> Result<Vec<u8>, CryptoError> {
        let mut collector = ByteCollector::default();
        updater.update(&mut collector)?;
        let signature = self.signing_key.sign(&collector.bytes);
        log::trace!("signed {} preimage bytes", collector.bytes.len());
        Ok(signature.to_bytes().as_ref().to_vec())
    }
}

/// Verifies with a public key, SHA256withRSA / PKCS#1 v1.5.
pub struct RsaPublicKeyValidator {
    verifying_key: VerifyingKey<Sha256>,
}

impl RsaPublicKeyValidator {
    /// Wraps a public key for verification.
    #[must_use]
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self {
            verifying_key: VerifyingKey::new(public_key),
        }
    }
}

impl SignatureValidator for RsaPublicKeyValidator {
    fn validate(
        &self,
        updater: &dyn SignatureUpdater,
        signature_bytes: &[u8],
    ) -> Result<bool, CryptoError> {
        let mut collector = ByteCollector::default();
        updater.update(&mut collector)?;

        let signature = match rsa::pkcs1v15::Signature::try_from(signature_bytes) {
            Ok(sig) => sig,
            Err(_) => {
                log::warn!("rejected malformed signature ({} bytes)", signature_bytes.len());
                return Ok(false);
            }
        };

        let valid = self.verifying_key.verify(&collector.bytes, &signature).is_ok();
        if !valid {
            log::warn!("signature did not verify against the provided key");
        }
        Ok(valid)
    }
}

#[derive(Default)]
struct ByteCollector {
    bytes: Vec<u8>,
}

impl SignatureOutput for ByteCollector {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.bytes.extend_from_slice(data);
        Ok(())
    }
}
