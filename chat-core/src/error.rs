//! Error kinds surfaced by the chat core. None of these are recovered
//! internally; every variant is meant to be surfaced to the caller, who
//! decides policy (drop the message, kick the peer, log and continue).

use thiserror::Error;

use crate::ids::PlayerId;

/// Errors the chat core can return. Carries enough context (peer ids,
/// underlying crypto errors) for the caller to act without re-deriving it.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Signing was attempted before [`crate::identity::IdentityStore::set_keys`]
    /// installed a keypair.
    #[error("signing attempted before a keypair was installed")]
    KeysNotSet,

    /// Verification was attempted for a sender with no registered public
    /// key.
    #[error("no public key registered for peer {0}")]
    UnknownPeerKey(PlayerId),

    /// Cryptographic verification of a message's signature failed.
    #[error("signature verification failed")]
    BadSignature,

    /// `verify_chain` detected a previous-signature mismatch; the message
    /// must be rejected.
    #[error("previous-signature chain is broken for peer {0}")]
    BrokenChain(PlayerId),

    /// The pending-ack queue for a peer would exceed its cap; the caller
    /// should disconnect that peer.
    #[error("pending-ack queue overflow for peer {0}, disconnect required")]
    OverflowKick(PlayerId),

    /// A cryptographic primitive (key encoding, signing, verification
    /// plumbing) failed below the core.
    #[error("cryptographic operation failed: {0}")]
    Crypto(#[from] chat_crypto::CryptoError),
}
