//! Canonical chat-message preimage, hashing, and the `SignedMessage`/
//! `MessageRef` record types.
//!
//! The byte layout in [`ChatPreimage`] is the single place the 10-field
//! canonical preimage table is assembled; both the signer and the verifier
//! drive it through the same `chat_crypto::SignatureUpdater` so the sign
//! and verify paths can never drift apart.

use chat_crypto::signature::{SignatureOutput, SignatureUpdater};
use chat_crypto::CryptoError;
use sha2::{Digest, Sha256};

use crate::config::SIGNATURE_VERSION;
use crate::ids::{PlayerId, SessionId};

/// A reference to a previously received signed message: the sender's
/// monotonically-assigned index, plus the full signature bytes that are
/// actually used for ordering and hashing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRef {
    /// The sender-assigned index of the referenced message.
    pub index: u32,
    /// The referenced message's full signature bytes.
    pub signature: Box<[u8]>,
}

impl MessageRef {
    /// Builds a reference from a message's index and signature.
    #[must_use]
    pub fn new(index: u32, signature: impl Into<Box<[u8]>>) -> Self {
        Self {
            index,
            signature: signature.into(),
        }
    }
}

/// A fully-formed signed chat message, inbound or outbound.
#[derive(Clone, Debug)]
pub struct SignedMessage {
    /// The message's sender.
    pub sender: PlayerId,
    /// The sender's chat session at the time this message was produced.
    pub session_id: SessionId,
    /// The sender's monotonically-assigned index for this message.
    pub index: u32,
    /// Seconds since the UNIX epoch; embedded in the hash at second
    /// resolution.
    pub timestamp: i64,
    /// Random per-message salt.
    pub salt: i64,
    /// SHA-256 of the canonical preimage.
    pub message_hash: [u8; 32],
    /// RSASSA-PKCS1-v1.5 signature over the preimage.
    pub signature: Box<[u8]>,
    /// Up to 20 previously-seen message signatures, oldest first, no
    /// duplicates.
    pub last_seen: Vec<MessageRef>,
    /// The exact UTF-8 bytes that were hashed.
    pub plaintext: String,
    /// The sender's prior message signature, for chain linkage. Absent for
    /// a sender's first message in a session.
    pub previous_signature: Option<Box<[u8]>>,
}

/// Inputs needed to build the canonical preimage for a chat message,
/// independent of whether it's being signed (outbound) or re-verified
/// (inbound).
pub struct ChatPreimage<'a> {
    /// Message sender.
    pub sender: PlayerId,
    /// Sender's session id at the time of this message.
    pub session_id: SessionId,
    /// Sender-assigned message index.
    pub index: u32,
    /// Random per-message salt.
    pub salt: i64,
    /// Seconds since the UNIX epoch.
    pub timestamp: i64,
    /// The plaintext bytes being signed.
    pub plaintext: &'a str,
    /// Last-seen signatures, oldest first.
    pub last_seen: &'a [MessageRef],
}

impl SignatureUpdater for ChatPreimage<'_> {
    fn update(&self, output: &mut dyn SignatureOutput) -> Result<(), CryptoError> {
        output.update(&SIGNATURE_VERSION.to_be_bytes())?;
        output.update(&self.sender.to_be_bytes())?;
        output.update(&self.session_id.to_be_bytes())?;
        output.update(&self.index.to_be_bytes())?;
        output.update(&self.salt.to_be_bytes())?;
        output.update(&self.timestamp.to_be_bytes())?;

        let plaintext_bytes = self.plaintext.as_bytes();
        output.update(&(plaintext_bytes.len() as u32).to_be_bytes())?;
        output.update(plaintext_bytes)?;

        output.update(&(self.last_seen.len() as u32).to_be_bytes())?;
        for entry in self.last_seen {
            output.update(&entry.signature)?;
        }

        Ok(())
    }
}

impl ChatPreimage<'_> {
    /// Assembles the raw preimage bytes (used to compute `message_hash`
    /// directly, outside of signing/verifying).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        struct VecSink(Vec<u8>);
        impl SignatureOutput for VecSink {
            fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
                self.0.extend_from_slice(data);
                Ok(())
            }
        }
        let mut sink = VecSink(Vec::new());
        // Building the preimage cannot fail; `VecSink::update` is infallible.
        self.update(&mut sink).expect("preimage assembly is infallible");
        sink.0
    }

    /// Computes `message_hash`, the SHA-256 of the canonical preimage.
    #[must_use]
    pub fn message_hash(&self) -> [u8; 32] {
        Sha256::digest(self.to_bytes()).into()
    }
}

/// Computes the chat-header digest used when the host protocol requires an
/// envelope hash for rebroadcast: SHA-256 over
/// `previous_signature ‖ sender (16 bytes) ‖ message_hash (32 bytes)`.
#[must_use]
pub fn chat_header_digest(
    previous_signature: Option<&[u8]>,
    sender: PlayerId,
    message_hash: &[u8; 32],
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    if let Some(sig) = previous_signature {
        hasher.update(sig);
    }
    hasher.update(sender.to_be_bytes());
    hasher.update(message_hash);
    hasher.finalize().into()
}

/// Computes the chat-header digest for a specific message, using its own
/// `previous_signature`, `sender`, and `message_hash` fields.
#[must_use]
pub fn create_chat_header(msg: &SignedMessage) -> [u8; 32] {
    chat_header_digest(
        msg.previous_signature.as_deref(),
        msg.sender,
        &msg.message_hash,
    )
}
