//! Identity & session store: the player's immutable identifier, the
//! session's ephemeral identifier, the RSA keypair, and the monotonic
//! outbound message-index counter.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::ids::{PlayerId, SessionId};

/// Holds the identity material a session needs to sign and be recognized
/// by: a stable `PlayerId`, a session-scoped `SessionId`, the session's own
/// RSA keypair, and the strictly-increasing outbound message index.
///
/// The index counter is a plain atomic (not behind the keypair lock)
/// because it is dispensed far more often than the keypair changes and must
/// hand out distinct values to concurrent callers without blocking on
/// unrelated key reads.
pub struct IdentityStore {
    player_id: PlayerId,
    session_id: RwLock<SessionId>,
    keys: RwLock<Option<KeyMaterial>>,
    next_index: AtomicU32,
}

struct KeyMaterial {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl IdentityStore {
    /// Creates a store for `player_id` with a freshly generated
    /// `SessionId` and no keypair installed yet.
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            session_id: RwLock::new(SessionId::generate()),
            keys: RwLock::new(None),
            next_index: AtomicU32::new(0),
        }
    }

    /// Installs the keypair used for signing outbound messages and session
    /// data. Required before any signing operation.
    pub fn set_keys(&self, private_key: RsaPrivateKey, public_key: RsaPublicKey) {
        *self.keys.write() = Some(KeyMaterial {
            private_key,
            public_key,
        });
    }

    /// Returns `true` once [`Self::set_keys`] has installed a keypair.
    #[must_use]
    pub fn has_keys(&self) -> bool {
        self.keys.read().is_some()
    }

    /// Runs `f` with the installed private key, or returns `None` if no
    /// keypair has been installed.
    pub fn with_private_key<T>(&self, f: impl FnOnce(&RsaPrivateKey) -> T) -> Option<T> {
        self.keys.read().as_ref().map(|k| f(&k.private_key))
    }

    /// Returns a clone of the installed public key, if any.
    #[must_use]
    pub fn public_key(&self) -> Option<RsaPublicKey> {
        self.keys.read().as_ref().map(|k| k.public_key.clone())
    }

    /// The player's stable identifier.
    #[must_use]
    pub fn player_uuid(&self) -> PlayerId {
        self.player_id
    }

    /// The current session's identifier.
    #[must_use]
    pub fn session_uuid(&self) -> SessionId {
        *self.session_id.read()
    }

    /// Returns the current outbound message index and atomically
    /// increments it. Concurrent callers each observe a distinct,
    /// monotonically increasing value.
    #[must_use]
    pub fn next_message_index(&self) -> u32 {
        self.next_index.fetch_add(1, Ordering::SeqCst)
    }

    /// Resets the session: a fresh `SessionId` and the index counter back
    /// to 0. Used on a server transfer. Key material is left untouched,
    /// since the identity (not the session) survives a transfer.
    pub fn reset_session(&self) {
        *self.session_id.write() = SessionId::generate();
        self.next_index.store(0, Ordering::SeqCst);
    }
}
