//! RSA key pair generation and SubjectPublicKeyInfo DER encoding.

use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::CryptoError;

/// Generates a fresh RSA key pair at [`crate::RSA_KEY_BITS`].
pub fn generate_key_pair() -> Result<(RsaPrivateKey, RsaPublicKey), CryptoError> {
    let mut rng = rand::rng();
    let private_key = RsaPrivateKey::new(&mut rng, crate::RSA_KEY_BITS)?;
    let public_key = RsaPublicKey::from(&private_key);
    Ok((private_key, public_key))
}

/// Encodes a public key as X.509 SubjectPublicKeyInfo DER bytes.
///
/// This is bit-exactly the encoding embedded in the session-data signature
/// preimage, so callers must not substitute PEM or PKCS#1 here.
pub fn public_key_to_der(key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
    use rsa::pkcs8::EncodePublicKey;
    key.to_public_key_der()
        .map(|der| der.to_vec())
        .map_err(CryptoError::from)
}

/// Decodes a public key from X.509 SubjectPublicKeyInfo DER bytes.
pub fn public_key_from_der(bytes: &[u8]) -> Result<RsaPublicKey, CryptoError> {
    use rsa::pkcs8::DecodePublicKey;
    RsaPublicKey::from_public_key_der(bytes).map_err(CryptoError::from)
}

/// Encodes a private key as PKCS#8 DER bytes.
pub fn private_key_to_der(key: &RsaPrivateKey) -> Result<Vec<u8>, CryptoError> {
    use rsa::pkcs8::EncodePrivateKey;
    key.to_pkcs8_der()
        .map(|der| der.to_bytes().to_vec())
        .map_err(CryptoError::from)
}

/// Decodes a private key from PKCS#8 DER bytes.
pub fn private_key_from_der(bytes: &[u8]) -> Result<RsaPrivateKey, CryptoError> {
    use rsa::pkcs8::DecodePrivateKey;
    RsaPrivateKey::from_pkcs8_der(bytes).map_err(CryptoError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_usable_key_pair() {
        let result = generate_key_pair();
        assert!(result.is_ok());
    }

    #[test]
    fn public_key_der_round_trips() {
        let (_, public_key) = generate_key_pair().unwrap();
        let bytes = public_key_to_der(&public_key).unwrap();
        let decoded = public_key_from_der(&bytes).unwrap();
        assert_eq!(bytes, public_key_to_der(&decoded).unwrap());
    }

    #[test]
    fn private_key_der_round_trips() {
        let (private_key, _) = generate_key_pair().unwrap();
        let bytes = private_key_to_der(&private_key).unwrap();
        let decoded = private_key_from_der(&bytes).unwrap();
        assert_eq!(bytes, private_key_to_der(&decoded).unwrap());
    }
}
