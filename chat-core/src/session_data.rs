//! Builds the signed session-handshake payload a client advertises before
//! it may send signed chat.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chat_crypto::signature::{SignatureOutput, SignatureUpdater};
use chat_crypto::signature::Signer as _;
use chat_crypto::{CryptoError, RsaPrivateKeySigner};

use crate::config::ChatCoreConfig;
use crate::error::ChatError;
use crate::identity::IdentityStore;
use crate::ids::SessionId;

/// The signed session-handshake payload: session id, public key, expiry,
/// and a signature over all three, proving the session belongs to the
/// identity that owns the private key.
#[derive(Clone, Debug)]
pub struct ChatSessionData {
    /// The freshly generated session id.
    pub session_id: SessionId,
    /// The public key, SubjectPublicKeyInfo DER-encoded.
    pub public_key_der: Vec<u8>,
    /// Expiry, in milliseconds since the UNIX epoch.
    pub expires_at_millis: i64,
    /// Signature over `session_id ‖ expires_at_millis ‖ public_key_der`.
    pub signature: Box<[u8]>,
}

struct SessionPreimage<'a> {
    session_id: SessionId,
    expires_at_millis: i64,
    public_key_der: &'a [u8],
}

impl SignatureUpdater for SessionPreimage<'_> {
    fn update(&self, output: &mut dyn SignatureOutput) -> Result<(), CryptoError> {
        output.update(&self.session_id.to_be_bytes())?;
        output.update(&self.expires_at_millis.to_be_bytes())?;
        output.update(self.public_key_der)?;
        Ok(())
    }
}

/// Constructs [`ChatSessionData`] for a single local identity.
pub struct SessionDataBuilder {
    identity: Arc<IdentityStore>,
    config: ChatCoreConfig,
}

impl SessionDataBuilder {
    /// Builds a session-data builder over the given identity.
    #[must_use]
    pub fn new(identity: Arc<IdentityStore>, config: ChatCoreConfig) -> Self {
        Self { identity, config }
    }

    /// Generates a fresh session id, installs it (and resets the outbound
    /// message index to 0) into the identity store, and returns the signed
    /// session-handshake payload with an expiry of `now + session_expiry`.
    pub fn generate_session_data(&self, now: SystemTime) -> Result<ChatSessionData, ChatError> {
        if !self.identity.has_keys() {
            return Err(ChatError::KeysNotSet);
        }
        let public_key = self.identity.public_key().ok_or(ChatError::KeysNotSet)?;
        let public_key_der = chat_crypto::public_key_to_der(&public_key)?;

        let expires_at: SystemTime = now + self.config.session_expiry;
        let expires_at_millis = expires_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as i64;

        self.identity.reset_session();
        let session_id = self.identity.session_uuid();

        let preimage = SessionPreimage {
            session_id,
            expires_at_millis,
            public_key_der: &public_key_der,
        };

        let signature = self
            .identity
            .with_private_key(|private_key| {
                let signer = RsaPrivateKeySigner::new(private_key.clone());
                signer.sign(&preimage)
            })
            .ok_or(ChatError::KeysNotSet)??;

        log::debug!("generate_session_data: session_id={session_id} expires_at_millis={expires_at_millis}");

        Ok(ChatSessionData {
            session_id,
            public_key_der,
            expires_at_millis,
            signature: signature.into_boxed_slice(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;
    use chat_crypto::signature::SignatureValidator as _;
    use chat_crypto::RsaPublicKeyValidator;
    use uuid::Uuid;

    #[test]
    fn fails_without_keys() {
        let identity = Arc::new(IdentityStore::new(PlayerId(Uuid::new_v4())));
        let builder = SessionDataBuilder::new(identity, ChatCoreConfig::default());
        let result = builder.generate_session_data(UNIX_EPOCH);
        assert!(matches!(result, Err(ChatError::KeysNotSet)));
    }

    #[test]
    fn signature_verifies_against_public_key() {
        let identity = Arc::new(IdentityStore::new(PlayerId(Uuid::new_v4())));
        let (private_key, public_key) = chat_crypto::generate_key_pair().unwrap();
        identity.set_keys(private_key, public_key.clone());

        let builder = SessionDataBuilder::new(Arc::clone(&identity), ChatCoreConfig::default());
        let data = builder.generate_session_data(UNIX_EPOCH).unwrap();

        let preimage = SessionPreimage {
            session_id: data.session_id,
            expires_at_millis: data.expires_at_millis,
            public_key_der: &data.public_key_der,
        };
        let validator = RsaPublicKeyValidator::new(public_key);
        assert!(validator.validate(&preimage, &data.signature).unwrap());
    }

    #[test]
    fn expiry_is_24_hours_after_now_by_default() {
        let identity = Arc::new(IdentityStore::new(PlayerId(Uuid::new_v4())));
        let (private_key, public_key) = chat_crypto::generate_key_pair().unwrap();
        identity.set_keys(private_key, public_key);

        let builder = SessionDataBuilder::new(Arc::clone(&identity), ChatCoreConfig::default());
        let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let data = builder.generate_session_data(now).unwrap();

        let expected = (now + Duration::from_secs(24 * 60 * 60))
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;
        assert_eq!(data.expires_at_millis, expected);
    }

    #[test]
    fn generating_session_data_resets_the_message_index() {
        let identity = Arc::new(IdentityStore::new(PlayerId(Uuid::new_v4())));
        let (private_key, public_key) = chat_crypto::generate_key_pair().unwrap();
        identity.set_keys(private_key, public_key);
        identity.next_message_index();
        identity.next_message_index();

        let builder = SessionDataBuilder::new(Arc::clone(&identity), ChatCoreConfig::default());
        builder.generate_session_data(UNIX_EPOCH).unwrap();

        assert_eq!(identity.next_message_index(), 0);
    }
}
