//! Chat verifier: checks an inbound message's signature and its
//! previous-signature chain linkage against the chain store.

use std::sync::Arc;

use chat_crypto::signature::SignatureValidator as _;
use chat_crypto::RsaPublicKeyValidator;
use rsa::RsaPublicKey;

use crate::chain_store::ChatChainStore;
use crate::error::ChatError;
use crate::ids::PlayerId;
use crate::message::{ChatPreimage, SignedMessage};

/// Verifies inbound chat messages against stored peer public keys and
/// chain state.
pub struct ChatVerifier {
    store: Arc<ChatChainStore>,
}

impl ChatVerifier {
    /// Builds a verifier over the given chain store.
    #[must_use]
    pub fn new(store: Arc<ChatChainStore>) -> Self {
        Self { store }
    }

    /// Verifies `msg`'s signature. If `key` is absent, the sender's public
    /// key is resolved from the store; [`ChatError::UnknownPeerKey`] if
    /// none is registered. The full preimage is rebuilt from the fields
    /// carried on `msg` itself (sender, session id, index, salt, timestamp,
    /// plaintext, last_seen) rather than any value this core independently
    /// tracks, since the signature is only valid over the exact inputs the
    /// sender signed.
    pub fn verify_message(
        &self,
        msg: &SignedMessage,
        key: Option<RsaPublicKey>,
    ) -> Result<(), ChatError> {
        let key = match key {
            Some(k) => k,
            None => self
                .store
                .player_public_key(msg.sender)
                .ok_or(ChatError::UnknownPeerKey(msg.sender))?,
        };

        let preimage = ChatPreimage {
            sender: msg.sender,
            session_id: msg.session_id,
            index: msg.index,
            salt: msg.salt,
            timestamp: msg.timestamp,
            plaintext: &msg.plaintext,
            last_seen: &msg.last_seen,
        };

        let validator = RsaPublicKeyValidator::new(key);
        let valid = validator.validate(&preimage, &msg.signature)?;
        if valid {
            Ok(())
        } else {
            Err(ChatError::BadSignature)
        }
    }

    /// Verifies that `current_previous_signature` correctly links to
    /// `peer`'s chain:
    ///
    /// - no recorded signature for `peer` + a non-empty claimed previous
    ///   signature → broken chain.
    /// - a recorded signature that differs from the claim → broken chain.
    /// - otherwise → accepted. The caller is responsible for recording the
    ///   new signature via [`ChatChainStore::add_inbound`].
    pub fn verify_chain(
        &self,
        peer: PlayerId,
        current_previous_signature: Option<&[u8]>,
    ) -> Result<(), ChatError> {
        let stored = self.store.last_signature(peer);

        match (stored.as_deref(), current_previous_signature) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(ChatError::BrokenChain(peer)),
            (Some(_), None) => Err(ChatError::BrokenChain(peer)),
            (Some(stored), Some(claimed)) if stored == claimed => Ok(()),
            (Some(_), Some(_)) => Err(ChatError::BrokenChain(peer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatCoreConfig;
    use crate::identity::IdentityStore;
    use crate::ids::SessionId;
    use crate::signer::ChatSigner;
    use uuid::Uuid;

    fn peer() -> PlayerId {
        PlayerId(Uuid::new_v4())
    }

    #[test]
    fn round_trip_sign_then_verify_succeeds() {
        let identity = Arc::new(IdentityStore::new(peer()));
        let store = Arc::new(ChatChainStore::new(ChatCoreConfig::default()));
        let (private_key, public_key) = chat_crypto::generate_key_pair().unwrap();
        identity.set_keys(private_key, public_key.clone());

        let signer = ChatSigner::new(Arc::clone(&identity), Arc::clone(&store));
        let msg = signer.sign_message("hello", 1_700_000_000, 42).unwrap();

        let verifier = ChatVerifier::new(store);
        assert!(verifier.verify_message(&msg, Some(public_key)).is_ok());
    }

    #[test]
    fn tampered_plaintext_fails_verification() {
        let identity = Arc::new(IdentityStore::new(peer()));
        let store = Arc::new(ChatChainStore::new(ChatCoreConfig::default()));
        let (private_key, public_key) = chat_crypto::generate_key_pair().unwrap();
        identity.set_keys(private_key, public_key.clone());

        let signer = ChatSigner::new(Arc::clone(&identity), Arc::clone(&store));
        let mut msg = signer.sign_message("hello", 1_700_000_000, 42).unwrap();
        msg.plaintext = "hellp".to_string();

        let verifier = ChatVerifier::new(store);
        let result = verifier.verify_message(&msg, Some(public_key));
        assert!(matches!(result, Err(ChatError::BadSignature)));
    }

    #[test]
    fn verify_message_without_registered_key_fails() {
        let store = Arc::new(ChatChainStore::new(ChatCoreConfig::default()));
        let verifier = ChatVerifier::new(Arc::clone(&store));
        let sender = peer();
        let msg = SignedMessage {
            sender,
            session_id: SessionId::generate(),
            index: 0,
            timestamp: 0,
            salt: 0,
            message_hash: [0; 32],
            signature: vec![0u8; 256].into_boxed_slice(),
            last_seen: vec![],
            plaintext: "hi".to_string(),
            previous_signature: None,
        };
        let result = verifier.verify_message(&msg, None);
        assert!(matches!(result, Err(ChatError::UnknownPeerKey(_))));
    }

    #[test]
    fn chain_accepts_matching_previous_signature() {
        let store = Arc::new(ChatChainStore::new(ChatCoreConfig::default()));
        let verifier = ChatVerifier::new(Arc::clone(&store));
        let sender = peer();

        let m1 = SignedMessage {
            sender,
            session_id: SessionId::generate(),
            index: 0,
            timestamp: 0,
            salt: 0,
            message_hash: [0; 32],
            signature: vec![0xAAu8; 4].into_boxed_slice(),
            last_seen: vec![],
            plaintext: "first".to_string(),
            previous_signature: None,
        };
        assert!(verifier.verify_chain(sender, None).is_ok());
        store.add_inbound(m1.clone());

        assert!(verifier.verify_chain(sender, Some(&m1.signature)).is_ok());
    }

    #[test]
    fn chain_rejects_mismatched_previous_signature() {
        let store = Arc::new(ChatChainStore::new(ChatCoreConfig::default()));
        let verifier = ChatVerifier::new(Arc::clone(&store));
        let sender = peer();

        let m1 = SignedMessage {
            sender,
            session_id: SessionId::generate(),
            index: 0,
            timestamp: 0,
            salt: 0,
            message_hash: [0; 32],
            signature: vec![0xAAu8; 4].into_boxed_slice(),
            last_seen: vec![],
            plaintext: "first".to_string(),
            previous_signature: None,
        };
        store.add_inbound(m1);

        let result = verifier.verify_chain(sender, Some(&[0xBBu8; 4]));
        assert!(matches!(result, Err(ChatError::BrokenChain(_))));
    }
}
