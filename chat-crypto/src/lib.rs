//! Cryptographic primitives for Minecraft's signed chat system.
//!
//! This crate is deliberately stateless: it knows nothing about players,
//! sessions, or message chains. It only generates and encodes RSA key
//! material and signs/verifies arbitrary byte buffers with
//! RSASSA-PKCS1-v1_5 over SHA-256, the scheme Minecraft 1.19+ uses for
//! signed chat.

pub mod error;
pub mod keys;
pub mod signature;

pub use error::CryptoError;
pub use keys::{generate_key_pair, private_key_to_der, public_key_from_der, public_key_to_der};
pub use signature::{RsaPrivateKeySigner, RsaPublicKeyValidator, SignatureValidator, Signer};

/// Signing algorithm name used for chat messages (SHA256withRSA).
pub const SIGNING_ALGORITHM: &str = "SHA256withRSA";

/// RSA key size, in bits, used for newly generated chat session keys.
///
/// The real protocol expects 2048-bit keys (256-byte signatures); this is
/// what `S1`/`S2` style test vectors assume.
pub const RSA_KEY_BITS: usize = 2048;
