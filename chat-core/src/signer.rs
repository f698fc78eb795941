//! Chat signer: builds the canonical preimage for an outbound message,
//! signs it, and appends it to the chain store.

use std::sync::Arc;

use chat_crypto::signature::Signer as _;
use chat_crypto::RsaPrivateKeySigner;

use crate::chain_store::ChatChainStore;
use crate::error::ChatError;
use crate::identity::IdentityStore;
use crate::message::{ChatPreimage, MessageRef, SignedMessage};

/// Signs outbound chat messages on behalf of a single local identity.
///
/// Holds the store it reads from and writes to explicitly: the store is
/// passed into the constructor rather than reached for as ambient state.
pub struct ChatSigner {
    identity: Arc<IdentityStore>,
    store: Arc<ChatChainStore>,
}

impl ChatSigner {
    /// Builds a signer over the given identity and chain store.
    #[must_use]
    pub fn new(identity: Arc<IdentityStore>, store: Arc<ChatChainStore>) -> Self {
        Self { identity, store }
    }

    /// Signs `plaintext`, dispensing the next message index, pulling
    /// `last_seen` from the store's recent-inbound window and
    /// `previous_signature` from our own last recorded signature, then
    /// appending the result to the outbound log.
    ///
    /// `timestamp` (seconds since the epoch) and `salt` are supplied by the
    /// caller, who owns the wall clock and the random source.
    pub fn sign_message(
        &self,
        plaintext: &str,
        timestamp: i64,
        salt: i64,
    ) -> Result<SignedMessage, ChatError> {
        let last_seen = self.store.recent_inbound();
        self.sign_with_last_seen(plaintext, timestamp, salt, last_seen)
    }

    /// As [`Self::sign_message`], but with an explicit `last_seen` list
    /// rather than one pulled from the store. Exists so callers (and tests
    /// reproducing fixed vectors) can control exactly what gets hashed.
    pub fn sign_with_last_seen(
        &self,
        plaintext: &str,
        timestamp: i64,
        salt: i64,
        mut last_seen: Vec<MessageRef>,
    ) -> Result<SignedMessage, ChatError> {
        if !self.identity.has_keys() {
            return Err(ChatError::KeysNotSet);
        }

        let capacity = self.store.config().last_seen_capacity;
        if last_seen.len() > capacity {
            last_seen.drain(0..last_seen.len() - capacity);
        }

        let sender = self.identity.player_uuid();
        let session_id = self.identity.session_uuid();
        let index = self.identity.next_message_index();
        let previous_signature = self.store.last_signature(sender);

        let preimage = ChatPreimage {
            sender,
            session_id,
            index,
            salt,
            timestamp,
            plaintext,
            last_seen: &last_seen,
        };
        let message_hash = preimage.message_hash();

        let signature = self
            .identity
            .with_private_key(|private_key| {
                let signer = RsaPrivateKeySigner::new(private_key.clone());
                signer.sign(&preimage)
            })
            .ok_or(ChatError::KeysNotSet)??;

        let msg = SignedMessage {
            sender,
            session_id,
            index,
            timestamp,
            salt,
            message_hash,
            signature: signature.into_boxed_slice(),
            last_seen,
            plaintext: plaintext.to_string(),
            previous_signature,
        };

        log::debug!("sign_message: sender={sender} index={index}");
        self.store.add_outbound(msg.clone());
        Ok(msg)
    }
}
